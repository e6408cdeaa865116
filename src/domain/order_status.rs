// src/domain/order_status.rs

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Lifecycle state stored on every order row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    AdminPending,
    CustomerPending,
    Accepted,
    Completed,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::AdminPending,
        OrderStatus::CustomerPending,
        OrderStatus::Accepted,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::AdminPending => "ADMIN_PENDING",
            OrderStatus::CustomerPending => "CUSTOMER_PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Rejected => "REJECTED",
        }
    }

    /// Human label for templates.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Awaiting confirmation",
            OrderStatus::AdminPending => "Awaiting price review",
            OrderStatus::CustomerPending => "Quote ready",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }

    /// States in which the order total may still change.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::AdminPending | OrderStatus::CustomerPending
        )
    }

    /// Orders in these states hold a promo-code use.
    pub fn holds_promo(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled | OrderStatus::Rejected)
    }

    /// Status a freshly placed order starts in.
    pub fn initial(has_special_items: bool, auto_accept: bool) -> OrderStatus {
        if has_special_items {
            OrderStatus::AdminPending
        } else if auto_accept {
            OrderStatus::Accepted
        } else {
            OrderStatus::Pending
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Actor {
    Customer,
    Admin,
    System,
}

impl Actor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Actor::Customer => "customer",
            Actor::Admin => "admin",
            Actor::System => "system",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrderAction {
    Accept,
    Reject,
    Quote,
    AcceptQuote,
    RequestChanges,
    Cancel,
    Complete,
}

impl OrderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Accept => "accept",
            OrderAction::Reject => "reject",
            OrderAction::Quote => "quote",
            OrderAction::AcceptQuote => "accept quote",
            OrderAction::RequestChanges => "request changes",
            OrderAction::Cancel => "cancel",
            OrderAction::Complete => "complete",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {action} an order that is {from} (as {actor})")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub action: &'static str,
    pub actor: &'static str,
}

/// The full transition table. Anything not listed is rejected.
pub fn transition(
    from: OrderStatus,
    action: OrderAction,
    actor: Actor,
) -> Result<OrderStatus, TransitionError> {
    use OrderAction::*;
    use OrderStatus::*;

    let to = match (from, action, actor) {
        (Pending, Accept, Actor::Admin) => Some(Accepted),
        (Pending | AdminPending | CustomerPending, Reject, Actor::Admin) => Some(Rejected),
        (AdminPending | CustomerPending, Quote, Actor::Admin) => Some(CustomerPending),
        (CustomerPending, AcceptQuote, Actor::Customer) => Some(Accepted),
        (CustomerPending, RequestChanges, Actor::Customer) => Some(AdminPending),
        (Pending | AdminPending | CustomerPending, Cancel, Actor::Customer) => Some(Cancelled),
        (Accepted, Cancel, Actor::Admin) => Some(Cancelled),
        (Accepted, Complete, Actor::Admin) => Some(Completed),
        _ => None,
    };

    to.ok_or(TransitionError {
        from,
        action: action.as_str(),
        actor: actor.as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_db_string() {
        for st in OrderStatus::ALL {
            assert_eq!(st.as_str().parse::<OrderStatus>().unwrap(), st);
        }
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn initial_status_depends_on_special_items_and_store_setting() {
        assert_eq!(OrderStatus::initial(true, true), OrderStatus::AdminPending);
        assert_eq!(OrderStatus::initial(true, false), OrderStatus::AdminPending);
        assert_eq!(OrderStatus::initial(false, true), OrderStatus::Accepted);
        assert_eq!(OrderStatus::initial(false, false), OrderStatus::Pending);
    }

    #[test]
    fn special_pricing_path_goes_through_quote() {
        let s = transition(OrderStatus::AdminPending, OrderAction::Quote, Actor::Admin).unwrap();
        assert_eq!(s, OrderStatus::CustomerPending);
        let s = transition(s, OrderAction::RequestChanges, Actor::Customer).unwrap();
        assert_eq!(s, OrderStatus::AdminPending);
        let s = transition(s, OrderAction::Quote, Actor::Admin).unwrap();
        let s = transition(s, OrderAction::AcceptQuote, Actor::Customer).unwrap();
        assert_eq!(s, OrderStatus::Accepted);
        let s = transition(s, OrderAction::Complete, Actor::Admin).unwrap();
        assert_eq!(s, OrderStatus::Completed);
    }

    #[test]
    fn actors_cannot_take_each_others_actions() {
        assert!(transition(OrderStatus::Pending, OrderAction::Accept, Actor::Customer).is_err());
        assert!(
            transition(OrderStatus::CustomerPending, OrderAction::AcceptQuote, Actor::Admin)
                .is_err()
        );
        assert!(transition(OrderStatus::Accepted, OrderAction::Cancel, Actor::Customer).is_err());
    }

    #[test]
    fn terminal_states_reject_everything() {
        let actions = [
            OrderAction::Accept,
            OrderAction::Reject,
            OrderAction::Quote,
            OrderAction::AcceptQuote,
            OrderAction::RequestChanges,
            OrderAction::Cancel,
            OrderAction::Complete,
        ];
        for from in [
            OrderStatus::Completed,
            OrderStatus::Cancelled,
            OrderStatus::Rejected,
        ] {
            assert!(from.is_terminal());
            for action in actions {
                for actor in [Actor::Admin, Actor::Customer] {
                    assert!(transition(from, action, actor).is_err());
                }
            }
        }
    }

    #[test]
    fn transition_error_names_the_state() {
        let err = transition(OrderStatus::Completed, OrderAction::Cancel, Actor::Admin).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot cancel an order that is COMPLETED (as admin)"
        );
    }
}

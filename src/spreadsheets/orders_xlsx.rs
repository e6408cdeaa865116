use crate::db::orders::OrderSummary;
use crate::errors::ServerError;
use crate::responses::{xlsx_response, ResultResp};
use crate::util::format_ts;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

const HEADERS: [&str; 14] = [
    "Order",
    "Placed",
    "Customer",
    "Status",
    "Items",
    "Subtotal",
    "Discount",
    "Total",
    "Ship to",
    "Address",
    "City",
    "Postal code",
    "Country",
    "Customer note",
];

fn xlsx_err(what: &str) -> impl Fn(rust_xlsxwriter::XlsxError) -> ServerError + '_ {
    move |e| ServerError::XlsxError(format!("Failed to write {what}: {e}"))
}

fn write_text(ws: &mut Worksheet, r: u32, c: u16, value: &str, what: &str) -> Result<(), ServerError> {
    ws.write_string(r, c, value).map_err(xlsx_err(what))?;
    Ok(())
}

/// One row per order; amounts in major currency units.
fn orders_workbook(orders: &[OrderSummary]) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let money = Format::new().set_num_format("0.00");
    let worksheet = workbook.add_worksheet();

    for (col, header) in HEADERS.iter().enumerate() {
        write_text(worksheet, 0, col as u16, header, "header")?;
    }

    for (i, s) in orders.iter().enumerate() {
        let r = (i + 1) as u32;
        let o = &s.order;

        worksheet
            .write_number(r, 0, o.id as f64)
            .map_err(xlsx_err("order id"))?;
        write_text(worksheet, r, 1, &format_ts(o.created_at), "placed")?;
        write_text(worksheet, r, 2, &s.customer_email, "customer")?;
        write_text(worksheet, r, 3, o.status.as_str(), "status")?;
        worksheet
            .write_number(r, 4, s.item_count as f64)
            .map_err(xlsx_err("items"))?;

        for (col, cents) in [(5, o.subtotal_cents), (6, o.discount_cents), (7, o.total_cents)] {
            worksheet
                .write_number_with_format(r, col, cents as f64 / 100.0, &money)
                .map_err(xlsx_err("amount"))?;
        }

        write_text(worksheet, r, 8, &o.ship_name, "ship name")?;
        write_text(worksheet, r, 9, &o.ship_address, "address")?;
        write_text(worksheet, r, 10, &o.ship_city, "city")?;
        write_text(worksheet, r, 11, &o.ship_postal, "postal code")?;
        write_text(worksheet, r, 12, &o.ship_country, "country")?;
        write_text(worksheet, r, 13, o.customer_note.as_deref().unwrap_or(""), "note")?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))
}

pub fn export_orders_xlsx(orders: &[OrderSummary], store_slug: &str, status: Option<&str>) -> ResultResp {
    let buffer = orders_workbook(orders)?;
    let filename = match status {
        Some(s) => format!("orders_{store_slug}_{}.xlsx", s.to_ascii_lowercase()),
        None => format!("orders_{store_slug}.xlsx"),
    };
    xlsx_response(buffer, &filename)
}

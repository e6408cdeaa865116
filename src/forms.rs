// src/forms.rs
use std::collections::HashMap;
use std::io::Read;

use astra::Request;
use url::form_urlencoded;

use crate::errors::ServerError;

const MAX_FORM_BYTES: u64 = 64 * 1024;

/// Decoded `application/x-www-form-urlencoded` fields. Repeated keys keep every value.
#[derive(Debug, Default, Clone)]
pub struct Form {
    fields: HashMap<String, Vec<String>>,
}

impl Form {
    pub fn parse(raw: &[u8]) -> Self {
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();
        for (k, v) in form_urlencoded::parse(raw) {
            fields.entry(k.into_owned()).or_default().push(v.into_owned());
        }
        Self { fields }
    }

    /// Query string of the request URI.
    pub fn from_query(req: &Request) -> Self {
        Self::parse(req.uri().query().unwrap_or("").as_bytes())
    }

    /// Reads and decodes the request body.
    pub fn from_body(req: &mut Request) -> Result<Self, ServerError> {
        let mut raw = Vec::new();
        req.body_mut()
            .reader()
            .take(MAX_FORM_BYTES + 1)
            .read_to_end(&mut raw)
            .map_err(|_| ServerError::bad_request("could not read form body"))?;
        if raw.len() as u64 > MAX_FORM_BYTES {
            return Err(ServerError::bad_request("form body too large"));
        }
        Ok(Self::parse(&raw))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Trimmed value, `None` when missing or blank.
    pub fn get_trimmed(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn str_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn required(&self, key: &str) -> Result<&str, ServerError> {
        self.get_trimmed(key)
            .ok_or_else(|| ServerError::bad_request(format!("{key} is required")))
    }

    /// HTML checkboxes are present only when ticked.
    pub fn checkbox(&self, key: &str) -> bool {
        matches!(self.get(key), Some("on" | "true" | "1" | "yes"))
    }

    pub fn optional_i64(&self, key: &str) -> Result<Option<i64>, ServerError> {
        self.get_trimmed(key)
            .map(|v| {
                v.parse::<i64>()
                    .map_err(|_| ServerError::bad_request(format!("{key} must be a whole number")))
            })
            .transpose()
    }

    /// Fields whose key starts with `prefix`, with the prefix stripped.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.fields.iter().filter_map(move |(k, v)| {
            let rest = k.strip_prefix(prefix)?;
            Some((rest, v.first()?.as_str()))
        })
    }
}

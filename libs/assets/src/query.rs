//! Query arguments and their normalization
//!
//! Clients send a loosely typed argument bag ([`RawQuery`]); every provider
//! receives the same normalized [`Query`].

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AssetError, AssetResult};
use crate::store::LocalId;

/// Query argument bag as sent by a client
///
/// Accepts the canonical field names and the host's legacy names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawQuery {
    #[serde(alias = "paged")]
    pub page: Value,
    #[serde(alias = "posts_per_page")]
    pub page_size: Value,
    #[serde(alias = "s")]
    pub search: Value,
    #[serde(alias = "post_mime_type")]
    pub mime_type: Value,
    #[serde(alias = "orderby")]
    pub order_by: Value,
    pub order: Value,
    pub author: Value,
    pub year: Value,
    #[serde(alias = "monthnum")]
    pub month: Value,
    #[serde(alias = "post_parent")]
    pub parent: Value,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

impl FromStr for OrderDirection {
    type Err = AssetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(OrderDirection::Asc),
            "DESC" => Ok(OrderDirection::Desc),
            other => Err(AssetError::validation(format!(
                "Invalid order \"{other}\", expected ASC or DESC"
            ))),
        }
    }
}

/// Set of primary types (`image`) or full types (`image/png`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MimeFilter(BTreeSet<String>);

impl MimeFilter {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(types.into_iter().map(Into::into).collect())
    }

    /// Parse a single type or a comma separated list
    pub fn parse(value: &str) -> Self {
        Self::new(
            value
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty()),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    /// Whether a mime type falls under this filter
    pub fn matches(&self, mime_type: &str) -> bool {
        let primary = mime_type.split('/').next().unwrap_or_default();
        self.0.contains(mime_type) || self.0.contains(primary)
    }

    /// Comma separated form, the shape providers usually forward upstream
    pub fn joined(&self) -> String {
        self.0.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

/// Normalized query handed to providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// 1-based page number
    pub page: u32,
    /// Maximum number of items the provider may return
    pub page_size: Option<u32>,
    pub search_text: Option<String>,
    pub mime_type_filter: Option<MimeFilter>,
    pub order_by: Option<String>,
    pub order_direction: Option<OrderDirection>,
    pub author_filter: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Restrict to children of this local record
    pub parent_id: Option<LocalId>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
            search_text: None,
            mime_type_filter: None,
            order_by: None,
            order_direction: None,
            author_filter: None,
            year: None,
            month: None,
            parent_id: None,
        }
    }
}

impl Query {
    /// Normalize a client argument bag
    ///
    /// Numeric fields accept numbers or numeric strings. Empty strings and
    /// nulls count as absent. A page size of zero or less means "no cap".
    pub fn from_raw(raw: &RawQuery) -> AssetResult<Self> {
        let page = match coerce_int("page", &raw.page)? {
            None => 1,
            Some(page) if page >= 1 => to_u32("page", page)?,
            Some(page) => {
                return Err(AssetError::validation(format!(
                    "page must be 1 or greater, got {page}"
                )));
            }
        };

        let page_size = match coerce_int("page_size", &raw.page_size)? {
            Some(size) if size > 0 => Some(to_u32("page_size", size)?),
            _ => None,
        };

        let month = match coerce_int("month", &raw.month)? {
            None => None,
            Some(month) if (1..=12).contains(&month) => Some(month as u32),
            Some(month) => {
                return Err(AssetError::validation(format!(
                    "month must be between 1 and 12, got {month}"
                )));
            }
        };

        let year = coerce_int("year", &raw.year)?
            .map(|year| {
                i32::try_from(year)
                    .map_err(|_| AssetError::validation(format!("year {year} is out of range")))
            })
            .transpose()?;

        let order_direction = coerce_text("order", &raw.order)?
            .map(|order| order.parse::<OrderDirection>())
            .transpose()?;

        let parent_id = coerce_text("parent", &raw.parent)?
            .map(|parent| {
                Uuid::parse_str(&parent)
                    .map(LocalId)
                    .map_err(|_| AssetError::validation(format!("Invalid parent id \"{parent}\"")))
            })
            .transpose()?;

        Ok(Self {
            page,
            page_size,
            search_text: coerce_text("search", &raw.search)?,
            mime_type_filter: coerce_mime_filter(&raw.mime_type)?,
            order_by: coerce_text("order_by", &raw.order_by)?,
            order_direction,
            author_filter: coerce_int("author", &raw.author)?,
            year,
            month,
            parent_id,
        })
    }

    /// Present fields as URL parameters; absent fields are left out entirely
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", self.page.to_string())];

        if let Some(size) = self.page_size {
            params.push(("page_size", size.to_string()));
        }
        if let Some(search) = &self.search_text {
            params.push(("search", search.clone()));
        }
        if let Some(filter) = &self.mime_type_filter {
            params.push(("mime_type", filter.joined()));
        }
        if let Some(order_by) = &self.order_by {
            params.push(("order_by", order_by.clone()));
        }
        if let Some(order) = self.order_direction {
            params.push(("order", order.as_str().to_string()));
        }
        if let Some(author) = self.author_filter {
            params.push(("author", author.to_string()));
        }
        if let Some(year) = self.year {
            params.push(("year", year.to_string()));
        }
        if let Some(month) = self.month {
            params.push(("month", month.to_string()));
        }
        if let Some(parent) = self.parent_id {
            params.push(("parent", parent.to_string()));
        }

        params
    }
}

fn to_u32(field: &str, value: i64) -> AssetResult<u32> {
    u32::try_from(value)
        .map_err(|_| AssetError::validation(format!("{field} {value} is out of range")))
}

fn coerce_int(field: &str, value: &Value) -> AssetResult<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(Some(int));
            }
            match number.as_f64() {
                Some(float) if float.fract() == 0.0 => Ok(Some(float as i64)),
                _ => Err(AssetError::validation(format!(
                    "{field} must be an integer, got {number}"
                ))),
            }
        }
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => text.trim().parse::<i64>().map(Some).map_err(|_| {
            AssetError::validation(format!("{field} must be an integer, got \"{text}\""))
        }),
        other => Err(AssetError::validation(format!(
            "{field} must be an integer, got {other}"
        ))),
    }
}

fn coerce_text(field: &str, value: &Value) -> AssetResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => Ok(Some(text.trim().to_string())),
        Value::Number(number) => Ok(Some(number.to_string())),
        other => Err(AssetError::validation(format!(
            "{field} must be a string, got {other}"
        ))),
    }
}

fn coerce_mime_filter(value: &Value) -> AssetResult<Option<MimeFilter>> {
    let filter = match value {
        Value::Null => return Ok(None),
        Value::String(text) => MimeFilter::parse(text),
        Value::Array(values) => {
            let mut types = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::String(text) => types.extend(
                        text.split(',')
                            .map(str::trim)
                            .filter(|part| !part.is_empty())
                            .map(str::to_string),
                    ),
                    other => {
                        return Err(AssetError::validation(format!(
                            "mime_type entries must be strings, got {other}"
                        )));
                    }
                }
            }
            MimeFilter::new(types)
        }
        other => {
            return Err(AssetError::validation(format!(
                "mime_type must be a string or a list, got {other}"
            )));
        }
    };

    Ok((!filter.is_empty()).then_some(filter))
}

//! HTTP DTOs for top-up endpoints.

use serde::{Deserialize, Serialize};

use crate::application::TopUpQuote;

/// POST /api/user/pay body.
#[derive(Debug, Clone, Deserialize)]
pub struct PayRequest {
    pub amount: i64,
    pub payment_method: String,
    #[serde(default)]
    pub top_up_code: Option<String>,
}

/// POST /api/user/amount body.
#[derive(Debug, Clone, Deserialize)]
pub struct AmountRequest {
    pub amount: i64,
    #[serde(default)]
    pub top_up_code: Option<String>,
}

/// `{message, data}` envelope used by the top-up endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct TopUpResponse<T: Serialize> {
    pub message: String,
    pub data: T,
}

impl<T: Serialize> TopUpResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            message: "success".to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayLinkData {
    pub pay_link: String,
    pub trade_no: String,
}

/// Amounts are rendered with two decimals, e.g. `"73.00"`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountData {
    pub pay_amount: String,
    pub charged_amount: String,
}

impl From<TopUpQuote> for AmountData {
    fn from(quote: TopUpQuote) -> Self {
        Self {
            pay_amount: quote.pay_amount.to_string(),
            charged_amount: quote.charged_amount.to_string(),
        }
    }
}

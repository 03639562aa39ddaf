use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PriceUpdateRequest {
    pub price: f64,
}

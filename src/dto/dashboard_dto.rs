use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct TrendParams {
    pub days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopProductsParams {
    pub limit: Option<usize>,
}

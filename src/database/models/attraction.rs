use serde::Serialize;
use sqlx::FromRow;

/// Tourist attraction reference data. Read-only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttractionInfo {
    pub content_id: i32,
    pub content_type_id: i32,
    pub title: String,
    pub addr1: Option<String>,
    pub addr2: Option<String>,
    pub zipcode: Option<String>,
    pub tel: Option<String>,
    pub first_image: Option<String>,
    pub first_image2: Option<String>,
    pub readcount: i32,
    pub sido_code: i32,
    pub gugun_code: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub mlevel: Option<String>,
    pub overview: Option<String>,
}

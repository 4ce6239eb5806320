use crate::error::MarketError;
use crate::storage::null_as_default;
use serde::{Deserialize, Serialize};

fn default_image() -> String {
    "📦".to_string()
}

fn default_seller() -> String {
    "Seller".to_string()
}

fn default_available() -> bool {
    true
}

// 상품 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default = "default_seller")]
    pub seller: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seller_email: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

// 상품 등록/수정 입력
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
}

impl ItemDraft {
    /// 필수 항목 검증
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.name.trim().is_empty() {
            return Err(MarketError::MissingField("name"));
        }
        if self.description.trim().is_empty() {
            return Err(MarketError::MissingField("description"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(MarketError::InvalidField(format!("price={}", self.price)));
        }
        Ok(())
    }

    pub fn image_or_default(&self) -> String {
        self.image
            .as_ref()
            .filter(|image| !image.trim().is_empty())
            .cloned()
            .unwrap_or_else(default_image)
    }
}

/// 판매 중인 상품이 하나도 없을 때 보여주는 데모 상품
pub fn demo_items() -> Vec<Item> {
    let demo = |id: &str, name: &str, description: &str, price: f64, image: &str, seller: &str| {
        Item {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            image: image.to_string(),
            seller: seller.to_string(),
            seller_email: String::new(),
            available: true,
        }
    };

    vec![
        demo(
            "1",
            "Vintage Camera",
            "Beautiful vintage camera in excellent condition",
            299.0,
            "📷",
            "Camera Store",
        ),
        demo(
            "2",
            "Designer Watch",
            "Luxury watch with leather strap",
            599.0,
            "⌚",
            "Time Pieces",
        ),
        demo(
            "3",
            "Laptop Stand",
            "Ergonomic aluminum laptop stand",
            49.0,
            "💻",
            "Tech Gear",
        ),
        demo(
            "4",
            "Coffee Maker",
            "Premium espresso machine",
            399.0,
            "☕",
            "Kitchen Pro",
        ),
        demo(
            "5",
            "Bookshelf",
            "Modern wooden bookshelf",
            199.0,
            "📚",
            "Furniture Hub",
        ),
        demo(
            "6",
            "Yoga Mat",
            "Eco-friendly yoga mat with carry bag",
            35.0,
            "🧘",
            "Fitness World",
        ),
    ]
}

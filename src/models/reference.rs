use serde::Serialize;
use uuid::Uuid;

/// Reference tables a filter selector can resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Category,
    Brand,
    Gender,
    Color,
    Size,
}

impl ReferenceKind {
    pub fn table(&self) -> &'static str {
        match self {
            ReferenceKind::Category => "categories",
            ReferenceKind::Brand => "brands",
            ReferenceKind::Gender => "genders",
            ReferenceKind::Color => "colors",
            ReferenceKind::Size => "sizes",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Gender {
    pub id: Uuid,
    pub label: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub hex_code: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Size {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sort_order: i32,
}

/// Everything a filter UI needs to render its selectors.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
    pub genders: Vec<Gender>,
    pub colors: Vec<Color>,
    pub sizes: Vec<Size>,
}

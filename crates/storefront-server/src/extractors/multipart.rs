//! Multipart product forms.

use axum::extract::Multipart;
use storefront_core::{NewProduct, ProductPatch};
use storefront_store::Upload;

use crate::error::AppError;

/// Fields and photos submitted with a product create or update.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub photos: Vec<Upload>,
}

impl ProductForm {
    /// Splits the form into the create body and its photos.
    pub fn into_new_product(self) -> (NewProduct, Vec<Upload>) {
        let product = NewProduct {
            name: self.name,
            price: self.price,
            stock: self.stock,
            category: self.category,
            description: self.description,
        };
        (product, self.photos)
    }

    /// Splits the form into a partial update and its photos.
    pub fn into_patch(self) -> (ProductPatch, Vec<Upload>) {
        let patch = ProductPatch {
            name: self.name,
            price: self.price,
            stock: self.stock,
            category: self.category,
            description: self.description,
        };
        (patch, self.photos)
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<Option<T>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("Invalid {field}")))
}

/// Reads every part of a product form.
///
/// Files arrive under `photos`; unknown text fields are ignored.
pub async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, AppError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "photos" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            if bytes.is_empty() {
                continue;
            }
            let mut upload = Upload::new(file_name, bytes.to_vec());
            if let Some(content_type) = content_type {
                upload = upload.with_content_type(content_type);
            }
            form.photos.push(upload);
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "name" => form.name = Some(value),
            "category" => form.category = Some(value),
            "description" => form.description = Some(value),
            "price" => form.price = parse_number("price", &value)?,
            "stock" => form.stock = parse_number("stock", &value)?,
            _ => {}
        }
    }

    Ok(form)
}

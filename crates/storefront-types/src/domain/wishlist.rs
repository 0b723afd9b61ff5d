use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WishlistAction {
    Added,
    Removed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wishlist {
    pub owner_id: String,
    pub product_ids: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl Wishlist {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            product_ids: vec![],
            updated_at: Utc::now(),
        }
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.product_ids.iter().any(|p| p == product_id)
    }

    /// Flip membership based on what the list holds right now.
    pub fn toggle(&mut self, product_id: &str) -> WishlistAction {
        self.updated_at = Utc::now();
        if self.contains(product_id) {
            self.product_ids.retain(|p| p != product_id);
            WishlistAction::Removed
        } else {
            self.product_ids.push(product_id.to_string());
            WishlistAction::Added
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_alternates_membership() {
        let mut list = Wishlist::new("user-1");
        assert_eq!(list.toggle("p1"), WishlistAction::Added);
        assert!(list.contains("p1"));
        assert_eq!(list.toggle("p1"), WishlistAction::Removed);
        assert!(!list.contains("p1"));
        assert_eq!(list.toggle("p1"), WishlistAction::Added);
    }
}

//! Static catalog lookup tables.
//!
//! The recommendation filters, login and storefront assembly consult a handful
//! of small mappings (face shape to tags, tag to shape names, role names,
//! marketplace names). They are plain data: built once at start-up, either from
//! the built-in defaults or from a JSON file, and then shared read-only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CategoryId, FaceShapeId, MarketplaceId, Role, RoleId, TagId, dedup_preserving_order};

/// Errors loading catalog tables.
#[derive(Debug, Error)]
pub enum CatalogTablesError {
    #[error("invalid catalog tables JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog tables have no id for role '{0}'")]
    MissingRole(Role),
}

/// Immutable lookup data for tag matching, roles and marketplaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTables {
    /// Face shape id to the detail tags that suit it.
    pub face_shape_tags: HashMap<FaceShapeId, Vec<TagId>>,
    /// Face shape name to id.
    pub face_shape_ids: HashMap<String, FaceShapeId>,
    /// Detail tag id to the face shape names it is labelled with.
    pub tag_names: HashMap<TagId, Vec<String>>,
    /// Role name to role id.
    pub roles: HashMap<String, RoleId>,
    /// Marketplace id to display name.
    pub marketplaces: HashMap<MarketplaceId, String>,
    /// Category searched by the face shape recommendation.
    pub glasses_category_id: CategoryId,
    /// Category searched by the personality recommendation.
    pub makeup_category_id: CategoryId,
}

impl CatalogTables {
    /// Parse tables from JSON and check they can serve login and registration.
    ///
    /// # Errors
    ///
    /// Returns `CatalogTablesError::Parse` for malformed JSON and
    /// `CatalogTablesError::MissingRole` if a built-in role has no id.
    pub fn from_json(json: &str) -> Result<Self, CatalogTablesError> {
        let tables: Self = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    fn validate(&self) -> Result<(), CatalogTablesError> {
        for role in [Role::Admin, Role::Partner, Role::Mobile] {
            if self.role_id_of(role).is_none() {
                return Err(CatalogTablesError::MissingRole(role));
            }
        }
        Ok(())
    }

    /// Tags suited to a face shape. Unknown shapes have none.
    #[must_use]
    pub fn face_shape_tags(&self, face_shape: FaceShapeId) -> &[TagId] {
        self.face_shape_tags
            .get(&face_shape)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Name of a face shape, e.g. `"oval"`.
    #[must_use]
    pub fn face_shape_name(&self, face_shape: FaceShapeId) -> Option<&str> {
        self.face_shape_ids
            .iter()
            .find(|(_, id)| **id == face_shape)
            .map(|(name, _)| name.as_str())
    }

    /// Human readable names for a product's tags.
    ///
    /// Names of every tag are concatenated in tag order, then deduplicated
    /// keeping the first occurrence. Unknown tags contribute nothing.
    #[must_use]
    pub fn tag_names_for(&self, tags: &[TagId]) -> Vec<String> {
        let names = tags
            .iter()
            .filter_map(|tag| self.tag_names.get(tag))
            .flatten()
            .cloned();
        dedup_preserving_order(names)
    }

    /// Id of a role by its login name.
    #[must_use]
    pub fn role_id(&self, name: &str) -> Option<RoleId> {
        self.roles.get(name).copied()
    }

    /// Id of a built-in role.
    #[must_use]
    pub fn role_id_of(&self, role: Role) -> Option<RoleId> {
        self.role_id(role.as_str())
    }

    /// Login name of a role id.
    #[must_use]
    pub fn role_name(&self, role_id: RoleId) -> Option<&str> {
        self.roles
            .iter()
            .find(|(_, id)| **id == role_id)
            .map(|(name, _)| name.as_str())
    }

    /// Display name of a marketplace.
    #[must_use]
    pub fn marketplace_name(&self, marketplace: MarketplaceId) -> Option<&str> {
        self.marketplaces.get(&marketplace).map(String::as_str)
    }
}

impl Default for CatalogTables {
    fn default() -> Self {
        let face_shape_tags = [
            (1, vec![3]),
            (2, vec![1, 5]),
            (3, vec![4]),
            (4, vec![1, 2, 3, 4, 5, 6]),
            (5, vec![2, 6]),
            (6, vec![1, 5]),
        ]
        .into_iter()
        .map(|(shape, tags)| {
            (
                FaceShapeId::new(shape),
                tags.into_iter().map(TagId::new).collect::<Vec<_>>(),
            )
        })
        .collect();

        let face_shape_ids = [
            ("circle", 1),
            ("heart", 2),
            ("oblong", 3),
            ("oval", 4),
            ("square", 5),
            ("triangle", 6),
        ]
        .into_iter()
        .map(|(name, id)| (name.to_owned(), FaceShapeId::new(id)))
        .collect();

        let tag_names = [
            (1, &["heart", "oval", "triangle"][..]),
            (2, &["oval", "square"][..]),
            (3, &["circle", "oval"][..]),
            (4, &["oblong", "oval"][..]),
            (5, &["heart", "oval", "triangle"][..]),
            (6, &["oval", "square"][..]),
        ]
        .into_iter()
        .map(|(tag, names)| {
            (
                TagId::new(tag),
                names.iter().map(|name| (*name).to_owned()).collect::<Vec<_>>(),
            )
        })
        .collect();

        let roles = [(Role::Admin, 1), (Role::Partner, 2), (Role::Mobile, 3)]
            .into_iter()
            .map(|(role, id)| (role.as_str().to_owned(), RoleId::new(id)))
            .collect();

        let marketplaces = [
            (1, "Tokopedia"),
            (2, "Shopee"),
            (3, "Lazada"),
            (4, "Blibli"),
            (5, "Bukalapak"),
        ]
        .into_iter()
        .map(|(id, name)| (MarketplaceId::new(id), name.to_owned()))
        .collect();

        Self {
            face_shape_tags,
            face_shape_ids,
            tag_names,
            roles,
            marketplaces,
            glasses_category_id: CategoryId::new(1),
            makeup_category_id: CategoryId::new(2),
        }
    }
}

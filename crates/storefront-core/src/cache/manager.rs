use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::catalog::CategoryGroup;
use crate::models::Product;

/// Product lists older than this are refetched on open.
const CACHE_STALE_MINUTES: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Negative ages come from clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// JSON file cache for catalog data, one file per entry.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(self.cache_path(name), contents)?;
        Ok(())
    }

    fn products_key(group: &CategoryGroup) -> String {
        format!("products_{}", group.key())
    }

    pub fn load_products(&self, group: &CategoryGroup) -> Result<Option<CachedData<Vec<Product>>>> {
        self.load(&Self::products_key(group))
    }

    pub fn save_products(&self, group: &CategoryGroup, products: &[Product]) -> Result<()> {
        self.save(&Self::products_key(group), &products)
    }

    /// Cached list for a group, or `None` when missing or unreadable.
    pub fn products_or_none(&self, group: &CategoryGroup) -> Option<CachedData<Vec<Product>>> {
        match self.load_products(group) {
            Ok(cached) => cached,
            Err(e) => {
                debug!(group = group.label, error = %e, "Ignoring unreadable product cache");
                None
            }
        }
    }

    /// Remove every cached product list. Used on logout.
    pub fn clear(&self) -> Result<()> {
        for entry in std::fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            let is_products = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("products_") && name.ends_with(".json"));
            if is_products {
                std::fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATEGORY_GROUPS;
    use chrono::Duration;

    fn product(id: i64, title: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id, "title": title, "description": "d", "price": 10.0,
            "thumbnail": "https://x/y.png", "category": "mens-shoes"
        }))
        .unwrap()
    }

    #[test]
    fn test_cached_data_age_display() {
        let mut cached = CachedData::new(vec![1]);
        assert_eq!(cached.age_display(), "just now");

        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");

        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");

        cached.cached_at = Utc::now() - Duration::hours(30);
        assert_eq!(cached.age_display(), "1d ago");
    }

    #[test]
    fn test_cached_data_is_stale() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(31);
        assert!(old.is_stale());
    }

    #[test]
    fn test_products_saved_per_group() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        let men = &CATEGORY_GROUPS[0];
        let women = &CATEGORY_GROUPS[1];

        assert!(cache.load_products(men).unwrap().is_none());

        cache.save_products(men, &[product(1, "Shirt"), product(2, "Boot")]).unwrap();

        let cached = cache.load_products(men).unwrap().unwrap();
        assert_eq!(cached.data.len(), 2);
        assert_eq!(cached.data[1].title, "Boot");
        assert!(cache.load_products(women).unwrap().is_none());
    }

    #[test]
    fn test_unreadable_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        let group = &CATEGORY_GROUPS[0];
        std::fs::write(cache.cache_path(&CacheManager::products_key(group)), "{not json").unwrap();

        assert!(cache.load_products(group).is_err());
        assert!(cache.products_or_none(group).is_none());
    }

    #[test]
    fn test_clear_removes_only_product_lists() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        let group = &CATEGORY_GROUPS[1];
        cache.save_products(group, &[product(3, "Bag")]).unwrap();
        std::fs::write(dir.path().join("auth-storage.json"), "{}").unwrap();

        cache.clear().unwrap();

        assert!(cache.load_products(group).unwrap().is_none());
        assert!(dir.path().join("auth-storage.json").exists());
    }
}

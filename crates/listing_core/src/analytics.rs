use crate::{Property, PropertyStatus};

pub const TOP_PROPERTIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopProperty {
    pub id: String,
    pub title: String,
    pub views: u64,
}

/// Aggregates shown on the dashboard cards and the analytics view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_properties: usize,
    pub active_listings: usize,
    pub sold: usize,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_shares: u64,
    pub top_properties: Vec<TopProperty>,
}

impl DashboardStats {
    pub fn from_properties(properties: &[Property]) -> Self {
        let mut stats = DashboardStats {
            total_properties: properties.len(),
            ..Self::default()
        };
        for property in properties {
            if property.status.is_active() {
                stats.active_listings += 1;
            }
            if property.status == PropertyStatus::Sold {
                stats.sold += 1;
            }
            stats.total_views += property.views;
            stats.total_likes += property.likes;
            stats.total_shares += property.shares;
        }

        let mut ranked: Vec<&Property> = properties.iter().collect();
        ranked.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.title.cmp(&b.title)));
        stats.top_properties = ranked
            .into_iter()
            .take(TOP_PROPERTIES)
            .map(|property| TopProperty {
                id: property.id.clone(),
                title: property.title.clone(),
                views: property.views,
            })
            .collect();
        stats
    }

    /// Likes plus shares, as a share of views in percent. 0 when nothing was viewed.
    pub fn engagement_rate(&self) -> f64 {
        if self.total_views == 0 {
            return 0.0;
        }
        (self.total_likes + self.total_shares) as f64 * 100.0 / self.total_views as f64
    }
}

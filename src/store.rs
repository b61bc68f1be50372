//! In-memory feature request store with thread-safe access
//!
//! Holds the authoritative set of feature records behind a single RwLock:
//! reads share the lock, mutations take it exclusively, and no guard
//! outlives the operation that took it.

use crate::error::{FeatureBoardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A single feature request tracked by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub details: String,
    pub upvotes: u64,
    pub completed: bool,
}

/// Reduced projection of a feature used for listing and ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub id: u64,
    pub title: String,
    pub upvotes: u64,
    pub completed: bool,
}

impl Feature {
    /// Project the record down to its listing summary
    pub fn summary(&self) -> FeatureSummary {
        FeatureSummary {
            id: self.id,
            title: self.title.clone(),
            upvotes: self.upvotes,
            completed: self.completed,
        }
    }
}

/// Trait defining the interface for feature storage operations
pub trait Store: Send + Sync {
    /// List summaries of all features, most upvoted first
    async fn list_summaries(&self) -> Result<Vec<FeatureSummary>>;

    /// Get the single most upvoted feature
    async fn top_feature(&self) -> Result<FeatureSummary>;

    /// Get the full record for a feature
    async fn get_feature(&self, id: u64) -> Result<Feature>;

    /// Create a new feature with the next sequential id
    async fn add_feature(&self, title: String, description: String, details: String)
        -> Result<Feature>;

    /// Increment a feature's upvote count by one
    async fn vote_feature(&self, id: u64) -> Result<Feature>;

    /// Mark a feature as completed
    async fn complete_feature(&self, id: u64) -> Result<Feature>;

    /// Remove a feature permanently
    async fn delete_feature(&self, id: u64) -> Result<()>;

    /// Get the number of stored features
    async fn len(&self) -> Result<usize>;
}

/// Record map and id counter, kept under one lock so allocation and
/// insertion are a single critical section.
struct Board {
    features: HashMap<u64, Feature>,
    next_id: u64,
}

/// Thread-safe in-memory feature store
pub struct MemoryStore {
    board: Arc<RwLock<Board>>,
}

fn not_found(id: u64) -> FeatureBoardError {
    FeatureBoardError::NotFound(format!("feature with id {} not found", id))
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            board: Arc::new(RwLock::new(Board {
                features: HashMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Create a store populated with the launch data set
    pub fn with_seed_data() -> Self {
        let mut features = HashMap::new();
        for feature in seed_features() {
            features.insert(feature.id, feature);
        }

        Self {
            board: Arc::new(RwLock::new(Board {
                features,
                next_id: 6,
            })),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            board: Arc::clone(&self.board),
        }
    }
}

impl Store for MemoryStore {
    async fn list_summaries(&self) -> Result<Vec<FeatureSummary>> {
        let board = self.board.read().await;

        let mut features: Vec<&Feature> = board.features.values().collect();
        // Ties on upvotes are broken by ascending id to keep the order
        // deterministic regardless of map iteration order.
        features.sort_by(|a, b| b.upvotes.cmp(&a.upvotes).then(a.id.cmp(&b.id)));

        Ok(features.iter().map(|f| f.summary()).collect())
    }

    async fn top_feature(&self) -> Result<FeatureSummary> {
        let board = self.board.read().await;

        let mut top: Option<&Feature> = None;
        for feature in board.features.values() {
            let better = match top {
                None => true,
                Some(best) => {
                    feature.upvotes > best.upvotes
                        || (feature.upvotes == best.upvotes && feature.id < best.id)
                }
            };
            if better {
                top = Some(feature);
            }
        }

        top.map(Feature::summary)
            .ok_or_else(|| FeatureBoardError::NotFound("no features found".to_string()))
    }

    async fn get_feature(&self, id: u64) -> Result<Feature> {
        let board = self.board.read().await;
        board.features.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    async fn add_feature(
        &self,
        title: String,
        description: String,
        details: String,
    ) -> Result<Feature> {
        // Validate before taking the write lock; a rejected request must
        // not touch the id counter.
        if title.is_empty() {
            return Err(FeatureBoardError::InvalidArgument(
                "title is required".to_string(),
            ));
        }

        let mut board = self.board.write().await;
        let feature = Feature {
            id: board.next_id,
            title,
            description,
            details,
            upvotes: 0,
            completed: false,
        };
        board.features.insert(feature.id, feature.clone());
        board.next_id += 1;

        Ok(feature)
    }

    async fn vote_feature(&self, id: u64) -> Result<Feature> {
        let mut board = self.board.write().await;
        let feature = board.features.get_mut(&id).ok_or_else(|| not_found(id))?;
        feature.upvotes += 1;
        Ok(feature.clone())
    }

    async fn complete_feature(&self, id: u64) -> Result<Feature> {
        let mut board = self.board.write().await;
        let feature = board.features.get_mut(&id).ok_or_else(|| not_found(id))?;
        feature.completed = true;
        Ok(feature.clone())
    }

    async fn delete_feature(&self, id: u64) -> Result<()> {
        let mut board = self.board.write().await;
        board
            .features
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    async fn len(&self) -> Result<usize> {
        let board = self.board.read().await;
        Ok(board.features.len())
    }
}

/// The five features every fresh server starts with
fn seed_features() -> Vec<Feature> {
    vec![
        Feature {
            id: 1,
            title: "Dark Mode".to_string(),
            description: "Add dark theme support to the application".to_string(),
            details: "Implement a comprehensive dark mode that includes:\n\n- Automatic detection of system preference\n- Manual toggle in user settings\n- Dark variants for all UI components including buttons, forms, modals, and navigation\n- Proper contrast ratios for accessibility compliance\n- Smooth transitions between light and dark modes\n- Persistence of user preference across sessions\n- Support for custom accent colors in dark mode\n\nThis feature should integrate seamlessly with the existing design system and maintain consistency across all pages and components.".to_string(),
            upvotes: 142,
            completed: false,
        },
        Feature {
            id: 2,
            title: "Mobile App".to_string(),
            description: "Native mobile application for iOS and Android".to_string(),
            details: "Develop native mobile applications for both iOS and Android platforms:\n\n**iOS App:**\n- Swift/SwiftUI implementation\n- iOS 14+ compatibility\n- App Store submission and compliance\n- Push notifications support\n- Offline functionality for core features\n\n**Android App:**\n- Kotlin implementation\n- Material Design 3 compliance\n- Android 8+ compatibility\n- Google Play Store submission\n- Background sync capabilities\n\n**Shared Features:**\n- Biometric authentication (Face ID, Touch ID, Fingerprint)\n- Deep linking support\n- Synchronized data across web and mobile\n- Performance optimization for battery life\n- Comprehensive testing on multiple devices".to_string(),
            upvotes: 98,
            completed: false,
        },
        Feature {
            id: 3,
            title: "API Integration".to_string(),
            description: "Third-party API integrations for popular services".to_string(),
            details: "Build robust integrations with popular third-party services:\n\n**Communication APIs:**\n- Slack workspace integration\n- Microsoft Teams connector\n- Discord webhook support\n- Email service providers (SendGrid, Mailgun)\n\n**Productivity Tools:**\n- Google Workspace (Docs, Sheets, Calendar)\n- Microsoft Office 365\n- Trello and Asana project management\n- Notion database sync\n\n**Development Tools:**\n- GitHub repository integration\n- GitLab CI/CD webhooks\n- Jira issue tracking\n- Jenkins build notifications\n\n**Technical Requirements:**\n- OAuth 2.0 authentication flows\n- Rate limiting and retry mechanisms\n- Webhook validation and security\n- API key management interface\n- Real-time status monitoring\n- Comprehensive error handling and logging".to_string(),
            upvotes: 76,
            completed: false,
        },
        Feature {
            id: 4,
            title: "Real-time Chat".to_string(),
            description: "Built-in real-time messaging system".to_string(),
            details: "Implement a comprehensive real-time messaging system:\n\n**Core Features:**\n- Instant messaging with WebSocket connections\n- Group chat rooms and private messaging\n- File sharing (images, documents, code snippets)\n- Message history and search functionality\n- Typing indicators and read receipts\n- Emoji reactions and custom emojis\n\n**Advanced Features:**\n- Message threading for organized discussions\n- Voice and video calling integration\n- Screen sharing capabilities\n- Message encryption for security\n- Customizable notifications\n- Message formatting (markdown support)\n\n**Technical Implementation:**\n- Scalable WebSocket infrastructure\n- Message persistence and backup\n- Real-time presence indicators\n- Mobile push notifications\n- Moderation tools and user management\n- Integration with existing user authentication".to_string(),
            upvotes: 54,
            completed: false,
        },
        Feature {
            id: 5,
            title: "Advanced Analytics".to_string(),
            description: "Detailed analytics dashboard with custom metrics".to_string(),
            details: "Create a powerful analytics platform with comprehensive insights:\n\n**Dashboard Features:**\n- Customizable widget layout\n- Real-time data visualization\n- Interactive charts and graphs\n- Drill-down capabilities for detailed analysis\n- Export functionality (PDF, Excel, CSV)\n- Scheduled report generation\n\n**Metrics and KPIs:**\n- User engagement tracking\n- Performance monitoring\n- Conversion funnel analysis\n- A/B testing results\n- Custom event tracking\n- Revenue and growth metrics\n\n**Advanced Capabilities:**\n- Machine learning insights and predictions\n- Anomaly detection and alerts\n- Cohort analysis and user segmentation\n- Custom query builder\n- API for programmatic access\n- Integration with Google Analytics and other tools\n\n**Technical Features:**\n- High-performance data processing\n- Real-time data streaming\n- Historical data retention policies\n- GDPR compliance and data privacy controls".to_string(),
            upvotes: 31,
            completed: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_assigns_sequential_ids() {
        let store = MemoryStore::new();

        let first = store
            .add_feature("Export to CSV".to_string(), "".to_string(), "".to_string())
            .await
            .unwrap();
        let second = store
            .add_feature("Keyboard shortcuts".to_string(), "".to_string(), "".to_string())
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.upvotes, 0);
        assert!(!first.completed);

        let fetched = store.get_feature(1).await.unwrap();
        assert_eq!(fetched, first);
    }

    #[tokio::test]
    async fn test_add_empty_title_rejected() {
        let store = MemoryStore::new();

        let err = store
            .add_feature("".to_string(), "desc".to_string(), "".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, FeatureBoardError::InvalidArgument(_)));
        assert_eq!(store.len().await.unwrap(), 0);

        // A rejected add must not consume an id.
        let feature = store
            .add_feature("Valid title".to_string(), "".to_string(), "".to_string())
            .await
            .unwrap();
        assert_eq!(feature.id, 1);
    }

    #[tokio::test]
    async fn test_vote_increments_only_target() {
        let store = MemoryStore::new();
        store
            .add_feature("A".to_string(), "".to_string(), "".to_string())
            .await
            .unwrap();
        store
            .add_feature("B".to_string(), "".to_string(), "".to_string())
            .await
            .unwrap();

        let voted = store.vote_feature(1).await.unwrap();
        assert_eq!(voted.upvotes, 1);
        assert_eq!(store.get_feature(2).await.unwrap().upvotes, 0);

        let voted = store.vote_feature(1).await.unwrap();
        assert_eq!(voted.upvotes, 2);

        let err = store.vote_feature(99).await.unwrap_err();
        assert!(matches!(err, FeatureBoardError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_complete_is_idempotent() {
        let store = MemoryStore::new();
        store
            .add_feature("A".to_string(), "".to_string(), "".to_string())
            .await
            .unwrap();

        let completed = store.complete_feature(1).await.unwrap();
        assert!(completed.completed);

        let completed_again = store.complete_feature(1).await.unwrap();
        assert!(completed_again.completed);

        let err = store.complete_feature(99).await.unwrap_err();
        assert!(matches!(err, FeatureBoardError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_is_permanent() {
        let store = MemoryStore::new();
        store
            .add_feature("A".to_string(), "".to_string(), "".to_string())
            .await
            .unwrap();

        store.delete_feature(1).await.unwrap();

        let err = store.get_feature(1).await.unwrap_err();
        assert!(matches!(err, FeatureBoardError::NotFound(_)));

        let err = store.delete_feature(1).await.unwrap_err();
        assert!(matches!(err, FeatureBoardError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ids_never_reused_after_delete() {
        let store = MemoryStore::new();
        store
            .add_feature("A".to_string(), "".to_string(), "".to_string())
            .await
            .unwrap();
        store
            .add_feature("B".to_string(), "".to_string(), "".to_string())
            .await
            .unwrap();

        store.delete_feature(2).await.unwrap();

        let feature = store
            .add_feature("C".to_string(), "".to_string(), "".to_string())
            .await
            .unwrap();
        assert_eq!(feature.id, 3);
    }

    #[tokio::test]
    async fn test_list_sorted_by_upvotes_descending() {
        let store = MemoryStore::with_seed_data();

        let summaries = store.list_summaries().await.unwrap();
        let upvotes: Vec<u64> = summaries.iter().map(|s| s.upvotes).collect();
        assert_eq!(upvotes, vec![142, 98, 76, 54, 31]);
        assert_eq!(summaries[0].title, "Dark Mode");
    }

    #[tokio::test]
    async fn test_list_ties_broken_by_ascending_id() {
        let store = MemoryStore::new();
        for title in ["A", "B", "C"] {
            store
                .add_feature(title.to_string(), "".to_string(), "".to_string())
                .await
                .unwrap();
        }
        store.vote_feature(2).await.unwrap();
        store.vote_feature(3).await.unwrap();

        let summaries = store.list_summaries().await.unwrap();
        let ids: Vec<u64> = summaries.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_top_feature_from_seed_data() {
        let store = MemoryStore::with_seed_data();

        let top = store.top_feature().await.unwrap();
        assert_eq!(top.id, 1);
        assert_eq!(top.title, "Dark Mode");
        assert_eq!(top.upvotes, 142);
    }

    #[tokio::test]
    async fn test_top_feature_tie_goes_to_lowest_id() {
        let store = MemoryStore::new();
        store
            .add_feature("A".to_string(), "".to_string(), "".to_string())
            .await
            .unwrap();
        store
            .add_feature("B".to_string(), "".to_string(), "".to_string())
            .await
            .unwrap();
        store.vote_feature(1).await.unwrap();
        store.vote_feature(2).await.unwrap();

        let top = store.top_feature().await.unwrap();
        assert_eq!(top.id, 1);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryStore::new();

        let err = store.top_feature().await.unwrap_err();
        assert!(matches!(err, FeatureBoardError::NotFound(_)));
        assert!(store.list_summaries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drained_store_behaves_like_empty() {
        let store = MemoryStore::with_seed_data();
        for id in 1..=5 {
            store.delete_feature(id).await.unwrap();
        }

        let err = store.top_feature().await.unwrap_err();
        assert!(matches!(err, FeatureBoardError::NotFound(_)));
        assert!(store.list_summaries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_votes_lose_no_updates() {
        let store = Arc::new(MemoryStore::with_seed_data());
        let initial = store.get_feature(1).await.unwrap().upvotes;
        let mut handles = vec![];

        for _ in 0..10 {
            let store_clone = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for _ in 0..10 {
                    store_clone.vote_feature(1).await.unwrap();
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get_feature(1).await.unwrap().upvotes, initial + 100);
    }
}

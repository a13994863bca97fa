use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};

use crate::{
    auth::{require_user, IdentityProvider},
    config::AppConfig,
    errors::CommerceError,
    events::{Event, EventSender},
    images::ImageHost,
    models::{
        order::{Order, OrderStatus},
        review::ProductReview,
    },
    store::{paths, DocumentStore},
};

/// A review as submitted from the order page. Photos are raw bytes; the
/// service uploads them to the image host before persisting.
#[derive(Debug, Clone, Default)]
pub struct ReviewInput {
    pub rating: u8,
    pub review: String,
    pub images: Vec<Vec<u8>>,
}

/// Reviews for delivered orders, stored at `reviews/{orderId}/{userId}`.
///
/// One review per user per order; resubmitting replaces the stored
/// document, which is how editing works.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    image_host: Arc<dyn ImageHost>,
    event_sender: Arc<EventSender>,
    config: Arc<AppConfig>,
}

impl ReviewService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        image_host: Arc<dyn ImageHost>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            identity,
            image_host,
            event_sender,
            config,
        }
    }

    /// Submits (or edits) the user's review for a delivered order.
    ///
    /// Photos upload concurrently, each bounded by the configured
    /// timeout. Individual upload failures drop that photo; if every
    /// photo of a non-empty batch fails, the whole submission fails and
    /// nothing is written.
    #[instrument(skip(self, input), fields(rating = input.rating, image_count = input.images.len()))]
    pub async fn submit_review(
        &self,
        order_id: &str,
        input: ReviewInput,
    ) -> Result<ProductReview, CommerceError> {
        let user = require_user(self.identity.as_ref())?;

        let order_doc = self
            .store
            .read(&paths::order(&user, order_id))
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("order {} not found", order_id)))?;
        let order: Order = serde_json::from_value(order_doc)?;

        if order.status != OrderStatus::Delivered {
            return Err(CommerceError::ValidationError(
                "Only delivered orders can be reviewed".to_string(),
            ));
        }
        if input.review.trim().is_empty() {
            return Err(CommerceError::ValidationError(
                "Please write a review".to_string(),
            ));
        }
        if input.rating < 1 || input.rating > 5 {
            return Err(CommerceError::ValidationError(
                "Please select a rating".to_string(),
            ));
        }

        let requested = input.images.len();
        let urls = self.upload_images(input.images).await;
        if requested > 0 && urls.is_empty() {
            return Err(CommerceError::ExternalServiceError(
                "Failed to upload images".to_string(),
            ));
        }

        let review = ProductReview {
            order_id: order_id.to_string(),
            rating: input.rating,
            review: input.review.trim().to_string(),
            images: urls,
            created_at: Utc::now(),
        };

        self.store
            .write(
                &paths::review(order_id, &user),
                serde_json::to_value(&review)?,
            )
            .await?;

        self.event_sender
            .send_or_log(Event::ReviewSubmitted {
                user_id: user,
                order_id: order_id.to_string(),
                rating: review.rating,
            })
            .await;
        Ok(review)
    }

    /// All reviews for an order, keyed by reviewer.
    #[instrument(skip(self))]
    pub async fn reviews_for_order(
        &self,
        order_id: &str,
    ) -> Result<BTreeMap<String, ProductReview>, CommerceError> {
        let snapshot = self.store.read(&paths::reviews(order_id)).await?;

        let map = match snapshot {
            Some(serde_json::Value::Object(map)) => map,
            _ => return Ok(BTreeMap::new()),
        };

        map.into_iter()
            .map(|(reviewer, doc)| Ok((reviewer, serde_json::from_value(doc)?)))
            .collect()
    }

    /// Uploads photos in parallel; failed or timed-out uploads are
    /// dropped with a warning.
    async fn upload_images(&self, images: Vec<Vec<u8>>) -> Vec<String> {
        let deadline = Duration::from_secs(self.config.image_upload_timeout_secs);

        let uploads = images.into_iter().map(|image| {
            let host = self.image_host.clone();
            async move {
                match tokio::time::timeout(deadline, host.upload(image)).await {
                    Ok(Ok(url)) => Some(url),
                    Ok(Err(e)) => {
                        warn!("Image upload failed: {}", e);
                        None
                    }
                    Err(_) => {
                        warn!("Image upload timed out after {:?}", deadline);
                        None
                    }
                }
            }
        });

        join_all(uploads).await.into_iter().flatten().collect()
    }
}

//! Post creation with unique slugs.

use folio_core::models::content::{Post, PostDraft};
use folio_core::slug::{candidate, slugify};
use folio_core::store::{PostStore, Store, StoreError};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Give up after this many numbered candidates.
const MAX_SLUG_ATTEMPTS: u32 = 1000;

/// Create a post whose slug is derived from its title, suffixed `-2`, `-3`, ...
/// until it is unique.
pub async fn create_post(store: &dyn Store, author_id: i64, draft: PostDraft) -> AppResult<Post> {
    let base = slugify(&draft.title);
    for n in 1..=MAX_SLUG_ATTEMPTS {
        let slug = candidate(&base, n);
        if store.post_slug_exists(&slug).await? {
            continue;
        }
        match store.create_post(author_id, &slug, draft.clone()).await {
            Ok(post) => {
                debug!(post_id = post.id, slug = %post.slug, "post created");
                return Ok(post);
            }
            // Lost a race for this slug; try the next one.
            Err(StoreError::Conflict(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::Conflict(format!(
        "no free slug for \"{base}\" after {MAX_SLUG_ATTEMPTS} attempts"
    )))
}

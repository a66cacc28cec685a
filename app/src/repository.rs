//! Theater and showtime repositories.
//!
//! Theaters and showtimes are not in the booking sheet. Features reach them
//! through these traits; the in-memory implementation is the default and
//! can be seeded with fixtures.

use crate::error::{RepositoryError, RepositoryResult};
use crate::types::{MovieShowtime, ShowtimeId, Theater, TheaterId};
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Boxed future returned by repository operations
pub type RepositoryFuture<T> = Pin<Box<dyn Future<Output = RepositoryResult<T>> + Send>>;

/// Storage for theaters
pub trait TheaterRepository: Send + Sync {
    /// Every theater, in insertion order
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be read
    fn fetch_all(&self) -> RepositoryFuture<Vec<Theater>>;

    /// Store a new theater
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the id is taken
    fn add(&self, theater: Theater) -> RepositoryFuture<()>;

    /// Replace the theater with the same id
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the id is unknown
    fn update(&self, theater: Theater) -> RepositoryFuture<()>;

    /// Remove a theater
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the id is unknown
    fn remove(&self, id: TheaterId) -> RepositoryFuture<()>;
}

/// Storage for showtimes
pub trait ShowtimeRepository: Send + Sync {
    /// Every showtime, in insertion order
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be read
    fn fetch_all(&self) -> RepositoryFuture<Vec<MovieShowtime>>;

    /// Store a new showtime
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the id is taken
    fn add(&self, showtime: MovieShowtime) -> RepositoryFuture<()>;

    /// Replace the showtime with the same id
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the id is unknown
    fn update(&self, showtime: MovieShowtime) -> RepositoryFuture<()>;

    /// Remove a showtime
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the id is unknown
    fn remove(&self, id: ShowtimeId) -> RepositoryFuture<()>;
}

/// Something stored by id
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identifier type
    type Id: Copy + Eq + Hash + Display + Send + Sync + 'static;

    /// Name used in error messages
    const KIND: &'static str;

    /// This entity's id
    fn id(&self) -> Self::Id;
}

impl Entity for Theater {
    type Id = TheaterId;
    const KIND: &'static str = "theater";

    fn id(&self) -> TheaterId {
        self.id
    }
}

impl Entity for MovieShowtime {
    type Id = ShowtimeId;
    const KIND: &'static str = "showtime";

    fn id(&self) -> ShowtimeId {
        self.id
    }
}

/// In-memory repository preserving insertion order
///
/// Clones share the same entities.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    items: Arc<RwLock<Vec<T>>>,
}

/// In-memory theater repository
pub type InMemoryTheaterRepository = InMemoryRepository<Theater>;

/// In-memory showtime repository
pub type InMemoryShowtimeRepository = InMemoryRepository<MovieShowtime>;

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T: Entity> InMemoryRepository<T> {
    /// Creates an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository seeded with `items`
    #[must_use]
    pub fn seeded(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    fn fetch_all_items(&self) -> RepositoryFuture<Vec<T>> {
        let items = Arc::clone(&self.items);
        Box::pin(async move { Ok(items.read().await.clone()) })
    }

    fn add_item(&self, item: T) -> RepositoryFuture<()> {
        let items = Arc::clone(&self.items);
        Box::pin(async move {
            let mut items = items.write().await;
            let id = item.id();
            if items.iter().any(|existing| existing.id() == id) {
                return Err(RepositoryError::Conflict {
                    entity: T::KIND,
                    id: id.to_string(),
                });
            }
            items.push(item);
            Ok(())
        })
    }

    fn update_item(&self, item: T) -> RepositoryFuture<()> {
        let items = Arc::clone(&self.items);
        Box::pin(async move {
            let mut items = items.write().await;
            let id = item.id();
            let Some(slot) = items.iter_mut().find(|existing| existing.id() == id) else {
                return Err(not_found::<T>(id));
            };
            *slot = item;
            Ok(())
        })
    }

    fn remove_item(&self, id: T::Id) -> RepositoryFuture<()> {
        let items = Arc::clone(&self.items);
        Box::pin(async move {
            let mut items = items.write().await;
            let Some(index) = items.iter().position(|existing| existing.id() == id) else {
                return Err(not_found::<T>(id));
            };
            items.remove(index);
            Ok(())
        })
    }
}

fn not_found<T: Entity>(id: T::Id) -> RepositoryError {
    RepositoryError::NotFound {
        entity: T::KIND,
        id: id.to_string(),
    }
}

impl TheaterRepository for InMemoryRepository<Theater> {
    fn fetch_all(&self) -> RepositoryFuture<Vec<Theater>> {
        self.fetch_all_items()
    }

    fn add(&self, theater: Theater) -> RepositoryFuture<()> {
        self.add_item(theater)
    }

    fn update(&self, theater: Theater) -> RepositoryFuture<()> {
        self.update_item(theater)
    }

    fn remove(&self, id: TheaterId) -> RepositoryFuture<()> {
        self.remove_item(id)
    }
}

impl ShowtimeRepository for InMemoryRepository<MovieShowtime> {
    fn fetch_all(&self) -> RepositoryFuture<Vec<MovieShowtime>> {
        self.fetch_all_items()
    }

    fn add(&self, showtime: MovieShowtime) -> RepositoryFuture<()> {
        self.add_item(showtime)
    }

    fn update(&self, showtime: MovieShowtime) -> RepositoryFuture<()> {
        self.update_item(showtime)
    }

    fn remove(&self, id: ShowtimeId) -> RepositoryFuture<()> {
        self.remove_item(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{SeatLayout, TheaterStatus, TheaterType};

    fn theater(name: &str) -> Theater {
        Theater {
            id: TheaterId::new(),
            name: name.to_string(),
            capacity: 20,
            theater_type: TheaterType::Standard,
            status: TheaterStatus::Active,
            seat_layout: SeatLayout::uniform(4, 5),
        }
    }

    #[tokio::test]
    async fn add_then_fetch_keeps_insertion_order() {
        let repo = InMemoryTheaterRepository::new();
        repo.add(theater("Hall 1")).await.unwrap();
        repo.add(theater("Hall 2")).await.unwrap();

        let names: Vec<_> = repo.fetch_all().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["Hall 1", "Hall 2"]);
    }

    #[tokio::test]
    async fn duplicate_id_is_a_conflict() {
        let hall = theater("Hall 1");
        let repo = InMemoryTheaterRepository::seeded(vec![hall.clone()]);

        let result = repo.add(hall).await;
        assert!(matches!(result, Err(RepositoryError::Conflict { entity: "theater", .. })));
    }

    #[tokio::test]
    async fn update_and_remove_require_an_existing_id() {
        let mut hall = theater("Hall 1");
        let repo = InMemoryTheaterRepository::seeded(vec![hall.clone()]);

        hall.status = TheaterStatus::Maintenance;
        repo.update(hall.clone()).await.unwrap();
        assert_eq!(repo.fetch_all().await.unwrap()[0].status, TheaterStatus::Maintenance);

        repo.remove(hall.id).await.unwrap();
        assert!(repo.fetch_all().await.unwrap().is_empty());

        let result = repo.remove(hall.id).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        let result = repo.update(hall).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }
}

//! The dashboard's screens, one per managed collection.

use admindash_core::RecordId;
use admindash_gateway::CollectionGateway;
use admindash_records::{Album, Comment, Photo, Post, Todo, User};

use crate::error::SyncError;
use crate::screen::Screen;

pub type AlbumsScreen<G> = Screen<Album, G>;
pub type PhotosScreen<G> = Screen<Photo, G>;
pub type PostsScreen<G> = Screen<Post, G>;
pub type CommentsScreen<G> = Screen<Comment, G>;
pub type TodosScreen<G> = Screen<Todo, G>;
pub type UsersScreen<G> = Screen<User, G>;

/// Users table page size.
pub const USERS_PAGE_SIZE: usize = 6;

impl<G> Screen<Todo, G>
where
    G: CollectionGateway + ?Sized,
{
    /// "Mark Complete" / "Mark Incomplete" on one row.
    pub async fn toggle_complete(&mut self, id: &RecordId) -> Result<bool, SyncError> {
        let patch = match self.sync.view().get(id) {
            Some(row) => row.data.toggle_patch(),
            None => {
                return Err(SyncError::Validation(format!("todo {id} is no longer listed")));
            }
        };
        self.sync.update(id, patch).await?;
        Ok(self.sync.view().get(id).is_some_and(|row| row.data.completed))
    }
}

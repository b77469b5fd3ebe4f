//! Items that render to a cloud-init user-data part.

use crate::error::Result;
use crate::options::RenderOptions;
use std::fmt;

/// Something that can be rendered as a single user-data part, either on its
/// own or as a child of a multipart document.
pub trait Renderable: fmt::Debug + Send + Sync {
    /// Returns true if rendering yields nothing.
    fn is_null(&self) -> bool;

    /// Renders the item as text, or `None` for a null item that must be
    /// omitted from the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be rendered with these options.
    fn render(&self, options: &RenderOptions) -> Result<Option<String>>;

    /// Clones the item behind a fresh box.
    fn box_clone(&self) -> Box<dyn Renderable>;
}

impl Clone for Box<dyn Renderable> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

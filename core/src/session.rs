//! Edit session backing the create/edit dialog.
//!
//! The session is the only place that decides whether a submission creates a
//! post or updates one: no target means create, a target means update of
//! that original record.

use crate::types::{Post, PostDraft, PostId};

/// Which controller path a submission of the session takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Create,
    Update(PostId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSession {
    target: Option<Post>,
    draft: PostDraft,
    open: bool,
}

impl EditSession {
    pub fn open_for_create(&mut self) {
        self.target = None;
        self.draft = PostDraft::default();
        self.open = true;
    }

    /// Seed the form from `post` and remember the original record.
    pub fn open_for_edit(&mut self, post: &Post) {
        self.draft = PostDraft::from(post);
        self.target = Some(post.clone());
        self.open = true;
    }

    pub fn cancel(&mut self) {
        self.clear();
    }

    pub fn close_on_success(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.target = None;
        self.draft = PostDraft::default();
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn target(&self) -> Option<&Post> {
        self.target.as_ref()
    }

    pub fn draft(&self) -> &PostDraft {
        &self.draft
    }

    /// `None` while the dialog is closed.
    pub fn mode(&self) -> Option<SessionMode> {
        if !self.open {
            return None;
        }
        Some(match &self.target {
            Some(post) => SessionMode::Update(post.id),
            None => SessionMode::Create,
        })
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.draft.body = body.into();
    }

    pub fn set_draft(&mut self, draft: PostDraft) {
        self.draft = draft;
    }
}

//! Listing selection and bulk delete.
//!
//! Tracks the server-reported file listing and a user-chosen selection
//! over it. The selection is always a subset of the listing: refreshing
//! the listing drops selections that no longer exist. A successful bulk
//! delete clears the selection, conservatively re-fetches the listing
//! (the server is the source of truth for what was actually removed),
//! and publishes a refresh signal so other views pick up the change.

use std::collections::BTreeSet;
use std::sync::Arc;

use markdash_core::{ClientError, RefreshToken};

use crate::api::ServerApi;
use crate::events::{EventSender, UiEvent};
use crate::signal::RefreshBus;

pub struct SelectionClient<A: ServerApi + ?Sized> {
    api: Arc<A>,
    bus: RefreshBus,
    events: EventSender,
    listing: Vec<String>,
    selected: BTreeSet<String>,
}

impl<A: ServerApi + ?Sized> SelectionClient<A> {
    pub fn new(api: Arc<A>, bus: RefreshBus, events: EventSender) -> Self {
        Self {
            api,
            bus,
            events,
            listing: Vec::new(),
            selected: BTreeSet::new(),
        }
    }

    pub fn listing(&self) -> &[String] {
        &self.listing
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    /// Replace the listing wholesale from the server and drop stale
    /// selections, preserving `selected ⊆ listing`.
    pub async fn refresh_listing(&mut self) -> Result<(), ClientError> {
        let files = self.api.list_uploads().await.map_err(ClientError::from)?;
        self.listing = files;
        self.selected
            .retain(|name| self.listing.iter().any(|f| f == name));
        Ok(())
    }

    /// Symmetric-difference update of the selection with `{name}`.
    /// Unknown names are ignored to keep the subset invariant.
    pub fn toggle(&mut self, name: &str) {
        if !self.listing.iter().any(|f| f == name) {
            return;
        }
        if !self.selected.remove(name) {
            self.selected.insert(name.to_string());
        }
    }

    /// Select everything unless everything is already selected, in which
    /// case clear the selection.
    pub fn toggle_all(&mut self) {
        if self.selected.len() == self.listing.len() {
            self.selected.clear();
        } else {
            self.selected = self.listing.iter().cloned().collect();
        }
    }

    /// Delete the selected files in one bulk request. Fails locally with
    /// `NoSelection` before any network call when nothing is selected.
    /// On a rejected delete the selection is preserved. Once the server
    /// confirms the delete, the refresh signal and success notification
    /// go out even if the follow-up re-list fails; the listing error is
    /// surfaced on its own. Returns the server's confirmation message.
    pub async fn delete_selected(&mut self) -> Result<String, ClientError> {
        if self.selected.is_empty() {
            let err = ClientError::NoSelection;
            let _ = self.events.send(UiEvent::error(err.client_message()));
            return Err(err);
        }

        let names: Vec<String> = self.selected.iter().cloned().collect();
        tracing::info!(count = names.len(), "Deleting selected files");

        match self.api.delete_uploads(&names).await {
            Err(e) => {
                let err = ClientError::DeleteFailed(e.to_string());
                let _ = self.events.send(UiEvent::error(err.client_message()));
                Err(err)
            }
            Ok(message) => {
                // Server state changed: signal other contexts before the
                // re-list, whose failure must not swallow the publish.
                self.selected.clear();
                self.bus
                    .publish(RefreshToken::now())
                    .map_err(|e| ClientError::Signal(e.to_string()))?;
                let _ = self.events.send(UiEvent::success(message.clone()));
                self.refresh_listing().await?;
                Ok(message)
            }
        }
    }
}

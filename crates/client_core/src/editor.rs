use std::sync::Arc;

use shared::{
    domain::{Category, CategoryId, Contact, ContactId},
    protocol::{CategoryFilter, ContactFields},
};
use tracing::{info, warn};

use crate::{
    gateway::ContactGateway,
    notice::{Notice, NoticeContext},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(ContactId),
}

pub struct ContactEditor {
    gateway: Arc<dyn ContactGateway>,
    mode: EditorMode,
    fields: ContactFields,
    categories: Vec<Category>,
    loading: bool,
}

impl ContactEditor {
    pub fn create(gateway: Arc<dyn ContactGateway>) -> Self {
        Self::with_mode(gateway, EditorMode::Create)
    }

    pub fn edit(gateway: Arc<dyn ContactGateway>, id: ContactId) -> Self {
        Self::with_mode(gateway, EditorMode::Edit(id))
    }

    fn with_mode(gateway: Arc<dyn ContactGateway>, mode: EditorMode) -> Self {
        Self {
            gateway,
            mode,
            fields: ContactFields::default(),
            categories: Vec::new(),
            loading: false,
        }
    }

    /// Edit mode: a failure here means the contact cannot be edited and the
    /// caller should leave the form. Create mode never fails; a missing
    /// category list only leaves the selection empty.
    pub async fn load(&mut self) -> Result<(), Notice> {
        self.loading = true;
        let result = self.load_inner().await;
        self.loading = false;
        result
    }

    async fn load_inner(&mut self) -> Result<(), Notice> {
        match self.mode.clone() {
            EditorMode::Create => {
                if let Err(notice) = self.load_categories().await {
                    warn!("category list unavailable: {notice}");
                }
                Ok(())
            }
            EditorMode::Edit(id) => {
                let contact = self
                    .gateway
                    .get_contact(&id)
                    .await
                    .map_err(|e| Notice::from_gateway(NoticeContext::LoadContact, &e))?;
                self.fields = fields_from_contact(&contact);
                self.load_categories().await
            }
        }
    }

    async fn load_categories(&mut self) -> Result<(), Notice> {
        self.categories = self
            .gateway
            .list_categories(&CategoryFilter::default())
            .await
            .map_err(|e| Notice::from_gateway(NoticeContext::LoadCategories, &e))?;
        Ok(())
    }

    pub async fn submit(&mut self) -> Result<Contact, Notice> {
        self.loading = true;
        let fields = self.fields.normalized();
        let result = match &self.mode {
            EditorMode::Create => self.gateway.create_contact(&fields).await,
            EditorMode::Edit(id) => self.gateway.update_contact(id, &fields).await,
        };
        self.loading = false;

        let saved = result.map_err(|e| Notice::from_gateway(NoticeContext::SaveContact, &e))?;
        info!(id = %saved.id, mode = ?self.mode, "contact saved");
        Ok(saved)
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn fields(&self) -> &ContactFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut ContactFields {
        &mut self.fields
    }

    /// Empty string clears the selection.
    pub fn select_category(&mut self, id: &str) {
        self.fields.category_id = Some(CategoryId::from(id)).filter(|id| !id.as_str().is_empty());
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

fn fields_from_contact(contact: &Contact) -> ContactFields {
    ContactFields {
        name: contact.name.clone(),
        email: contact.email.clone().unwrap_or_default(),
        phone: contact.phone.clone(),
        category_id: contact.category_id.clone(),
    }
}

#[cfg(test)]
#[path = "tests/editor_tests.rs"]
mod tests;

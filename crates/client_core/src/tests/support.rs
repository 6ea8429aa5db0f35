use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use shared::{
    domain::{Category, CategoryId, Contact, ContactId},
    protocol::{CategoryFilter, ContactFields, ContactFilter},
};
use tokio::sync::oneshot;

use crate::{
    error::{GatewayError, GatewayResult},
    gateway::ContactGateway,
};

pub enum ListReply {
    Ready(GatewayResult<Vec<Contact>>),
    Deferred(oneshot::Receiver<GatewayResult<Vec<Contact>>>),
}

#[derive(Default)]
pub struct ScriptedGateway {
    list_replies: Mutex<HashMap<ContactFilter, VecDeque<ListReply>>>,
    list_calls: Mutex<Vec<ContactFilter>>,
    delete_replies: Mutex<VecDeque<GatewayResult<()>>>,
    delete_calls: Mutex<Vec<ContactId>>,
    delete_gate: Mutex<Option<oneshot::Receiver<GatewayResult<()>>>>,
    contacts: Mutex<HashMap<ContactId, GatewayResult<Contact>>>,
    categories: Mutex<Option<GatewayResult<Vec<Category>>>>,
    saved: Mutex<Vec<(Option<ContactId>, ContactFields)>>,
    save_replies: Mutex<VecDeque<GatewayResult<Contact>>>,
}

impl ScriptedGateway {
    pub fn reply_list(&self, filter: ContactFilter, result: GatewayResult<Vec<Contact>>) {
        self.push_list(filter, ListReply::Ready(result));
    }

    /// Returns the sender that resolves the matching list call.
    pub fn defer_list(
        &self,
        filter: ContactFilter,
    ) -> oneshot::Sender<GatewayResult<Vec<Contact>>> {
        let (tx, rx) = oneshot::channel();
        self.push_list(filter, ListReply::Deferred(rx));
        tx
    }

    fn push_list(&self, filter: ContactFilter, reply: ListReply) {
        self.list_replies
            .lock()
            .expect("list replies")
            .entry(filter)
            .or_default()
            .push_back(reply);
    }

    pub fn reply_delete(&self, result: GatewayResult<()>) {
        self.delete_replies
            .lock()
            .expect("delete replies")
            .push_back(result);
    }

    /// Holds the next delete call until the returned sender resolves it.
    pub fn defer_delete(&self) -> oneshot::Sender<GatewayResult<()>> {
        let (tx, rx) = oneshot::channel();
        *self.delete_gate.lock().expect("delete gate") = Some(rx);
        tx
    }

    pub fn reply_contact(&self, id: &str, result: GatewayResult<Contact>) {
        self.contacts
            .lock()
            .expect("contacts")
            .insert(ContactId::from(id), result);
    }

    pub fn reply_categories(&self, result: GatewayResult<Vec<Category>>) {
        *self.categories.lock().expect("categories") = Some(result);
    }

    pub fn reply_save(&self, result: GatewayResult<Contact>) {
        self.save_replies
            .lock()
            .expect("save replies")
            .push_back(result);
    }

    pub fn list_calls(&self) -> Vec<ContactFilter> {
        self.list_calls.lock().expect("list calls").clone()
    }

    pub fn delete_calls(&self) -> Vec<ContactId> {
        self.delete_calls.lock().expect("delete calls").clone()
    }

    pub fn saved(&self) -> Vec<(Option<ContactId>, ContactFields)> {
        self.saved.lock().expect("saved").clone()
    }

    fn save(&self, id: Option<&ContactId>, fields: &ContactFields) -> GatewayResult<Contact> {
        let fields = fields.normalized();
        self.saved
            .lock()
            .expect("saved")
            .push((id.cloned(), fields.clone()));
        if let Some(reply) = self.save_replies.lock().expect("save replies").pop_front() {
            return reply;
        }
        Ok(Contact {
            id: id.cloned().unwrap_or_else(|| ContactId::from("new")),
            name: fields.name,
            email: Some(fields.email).filter(|email| !email.is_empty()),
            phone: fields.phone,
            category_id: fields.category_id,
            category_name: None,
        })
    }
}

#[async_trait]
impl ContactGateway for ScriptedGateway {
    async fn list_contacts(&self, filter: &ContactFilter) -> GatewayResult<Vec<Contact>> {
        self.list_calls
            .lock()
            .expect("list calls")
            .push(filter.clone());
        let reply = self
            .list_replies
            .lock()
            .expect("list replies")
            .get_mut(filter)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(ListReply::Ready(result)) => result,
            Some(ListReply::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(GatewayError::no_response("scripted reply dropped"))),
            None => Ok(Vec::new()),
        }
    }

    async fn get_contact(&self, id: &ContactId) -> GatewayResult<Contact> {
        self.contacts
            .lock()
            .expect("contacts")
            .get(id)
            .cloned()
            .unwrap_or_else(|| {
                Err(GatewayError::rejected(
                    StatusCode::NOT_FOUND,
                    Some("Contact not found".into()),
                ))
            })
    }

    async fn create_contact(&self, fields: &ContactFields) -> GatewayResult<Contact> {
        self.save(None, fields)
    }

    async fn update_contact(
        &self,
        id: &ContactId,
        fields: &ContactFields,
    ) -> GatewayResult<Contact> {
        self.save(Some(id), fields)
    }

    async fn delete_contact(&self, id: &ContactId) -> GatewayResult<()> {
        self.delete_calls
            .lock()
            .expect("delete calls")
            .push(id.clone());
        let gate = self.delete_gate.lock().expect("delete gate").take();
        if let Some(rx) = gate {
            return rx
                .await
                .unwrap_or_else(|_| Err(GatewayError::no_response("scripted reply dropped")));
        }
        let reply = self
            .delete_replies
            .lock()
            .expect("delete replies")
            .pop_front();
        reply.unwrap_or(Ok(()))
    }

    async fn list_categories(&self, _filter: &CategoryFilter) -> GatewayResult<Vec<Category>> {
        self.categories
            .lock()
            .expect("categories")
            .clone()
            .unwrap_or_else(|| {
                Ok(vec![Category {
                    id: CategoryId::from("c-1"),
                    name: "Family".into(),
                }])
            })
    }
}

pub fn contact(id: &str, name: &str) -> Contact {
    Contact {
        id: ContactId::from(id),
        name: name.to_string(),
        email: None,
        phone: format!("555-01{id:0>2}"),
        category_id: None,
        category_name: None,
    }
}

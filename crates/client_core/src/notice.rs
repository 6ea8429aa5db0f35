use std::fmt;

use crate::error::{GatewayError, GatewayErrorKind};

pub const CONNECTIVITY_MESSAGE: &str = "could not connect to the server";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeContext {
    LoadContacts,
    DeleteContact,
    LoadContact,
    SaveContact,
    LoadCategories,
}

impl NoticeContext {
    pub fn label(self) -> &'static str {
        match self {
            Self::LoadContacts => "failed to load contacts",
            Self::DeleteContact => "failed to delete contact",
            Self::LoadContact => "failed to load contact",
            Self::SaveContact => "failed to save contact",
            Self::LoadCategories => "failed to load categories",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    kind: GatewayErrorKind,
    context: NoticeContext,
    message: String,
}

impl Notice {
    pub fn from_gateway(context: NoticeContext, error: &GatewayError) -> Self {
        let message = match error {
            GatewayError::Rejected { message, .. } => format!("{}: {message}", context.label()),
            GatewayError::NoResponse { .. } => CONNECTIVITY_MESSAGE.to_string(),
            GatewayError::Malformed { message } => format!("{}: {message}", context.label()),
        };
        Self {
            kind: error.kind(),
            context,
            message,
        }
    }

    pub fn kind(&self) -> GatewayErrorKind {
        self.kind
    }

    pub fn context(&self) -> NoticeContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_connectivity(&self) -> bool {
        self.kind == GatewayErrorKind::NoResponse
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;

use crate::domain::ticket::TicketStateUpdate;
use crate::domain::types::WorkflowStateId;
use crate::forms::FormError;

#[derive(Deserialize)]
/// Form data for moving a ticket along its workflow.
pub struct TicketStateForm {
    pub state_id: i64,
}

impl TryFrom<TicketStateForm> for TicketStateUpdate {
    type Error = FormError;

    fn try_from(form: TicketStateForm) -> Result<Self, Self::Error> {
        let current_state_id =
            WorkflowStateId::new(form.state_id).map_err(|_| FormError::InvalidState)?;
        Ok(TicketStateUpdate { current_state_id })
    }
}

#[derive(MultipartForm)]
pub struct UploadAttachmentForm {
    #[multipart(limit = "25MB")]
    pub file: TempFile,
}

/// File contents extracted from an [`UploadAttachmentForm`].
pub struct AttachmentUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl TryFrom<&UploadAttachmentForm> for AttachmentUpload {
    type Error = FormError;

    fn try_from(form: &UploadAttachmentForm) -> Result<Self, Self::Error> {
        let file_name = form
            .file
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(FormError::InvalidFile)?
            .to_string();
        let bytes = std::fs::read(form.file.file.path()).map_err(|_| FormError::InvalidFile)?;
        if bytes.is_empty() {
            return Err(FormError::InvalidFile);
        }

        Ok(AttachmentUpload {
            file_name,
            content_type: form.file.content_type.as_ref().map(ToString::to_string),
            bytes,
        })
    }
}

use crate::content::NodeRef;
use serde::{Deserialize, Serialize};

/// Requests executed by the in-page capture payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScannerRequest {
    Capture(CaptureRequest),
    Click(ClickRequest),
    Clear(ClearRequest),
    Type(TypeRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CaptureRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickRequest {
    pub node: NodeRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearRequest {
    pub node: NodeRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRequest {
    pub node: NodeRef,
    pub text: String,
}

impl ScannerRequest {
    pub fn capture() -> Self {
        ScannerRequest::Capture(CaptureRequest::default())
    }

    /// Mutating requests may race a navigation; drivers treat a null result
    /// for them as success.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ScannerRequest::Click(_) | ScannerRequest::Clear(_) | ScannerRequest::Type(_)
        )
    }
}

/// Responses received from the capture payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScannerResponse {
    Ok {
        #[serde(default)]
        data: serde_json::Value,
    },
    Error {
        code: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_serialize_with_action_tag() {
        let req = ScannerRequest::Type(TypeRequest {
            node: NodeRef(7),
            text: "Byers".into(),
        });
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["action"], "type");
        assert_eq!(json["node"], 7);
        assert_eq!(json["text"], "Byers");
    }

    #[test]
    fn responses_parse_both_statuses() {
        let ok: ScannerResponse =
            serde_json::from_str(r#"{"status": "ok", "data": {"nodes": []}}"#).unwrap();
        assert!(matches!(ok, ScannerResponse::Ok { .. }));

        let err: ScannerResponse =
            serde_json::from_str(r#"{"status": "error", "code": "node_gone", "message": "stale"}"#)
                .unwrap();
        let ScannerResponse::Error { code, .. } = err else {
            panic!("expected error");
        };
        assert_eq!(code, "node_gone");
    }
}

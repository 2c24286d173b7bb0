//! URL automation stub.
//!
//! Turns an `{action, url, data}` request into a descriptive response and, for
//! known actions, a client-side script string. Nothing is executed here and
//! caller values are spliced into the script text as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::util::{interpolate, is_truthy};

/// Request fields. `None` is an absent key; `Some(Value::Null)` is an explicit
/// `null` and is echoed back as such.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutomationRequest {
    pub action: Option<Value>,
    pub url: Option<Value>,
    pub data: Option<Value>,
}

impl From<Value> for AutomationRequest {
    fn from(body: Value) -> Self {
        Self {
            action: body.get("action").cloned(),
            url: body.get("url").cloned(),
            data: body.get("data").cloned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutomationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Value>,
    pub success: bool,
    pub message: String,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

const YOUTUBE_SEARCH_URL: &str = "https://www.youtube.com/results?search_query=";

/// Known automation actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    YoutubeSearch,
    ScrollPage,
    FillInput,
    ClickElement,
    Login,
}

impl Action {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "youtube_search" => Some(Action::YoutubeSearch),
            "scroll_page" => Some(Action::ScrollPage),
            "fill_input" => Some(Action::FillInput),
            "click_element" => Some(Action::ClickElement),
            "login" => Some(Action::Login),
            _ => None,
        }
    }
}

/// Build the automation response for a request.
pub fn process(req: AutomationRequest) -> AutomationResponse {
    let action_text = interpolate(req.action.as_ref());
    let data = match req.data {
        Some(d) if is_truthy(Some(&d)) => d,
        _ => Value::Object(Map::new()),
    };
    let field = |key: &str| interpolate(data.get(key));

    let mut resp = AutomationResponse {
        action: req.action.clone(),
        url: req.url,
        success: true,
        message: format!("Automation action '{}' processed", action_text),
        data: Value::Null,
        script: None,
    };

    let action = req
        .action
        .as_ref()
        .and_then(Value::as_str)
        .and_then(Action::parse);

    match action {
        Some(Action::YoutubeSearch) => {
            resp.url = Some(Value::String(format!(
                "{}{}",
                YOUTUBE_SEARCH_URL,
                urlencoding::encode(&field("query"))
            )));
        }
        Some(Action::ScrollPage) => {
            let position = if is_truthy(data.get("position")) {
                field("position")
            } else {
                "0".to_string()
            };
            resp.script = Some(format!("window.scrollTo(0, {});", position));
        }
        Some(Action::FillInput) => {
            resp.script = Some(format!(
                "document.querySelector('{}').value = '{}';",
                field("selector"),
                field("value")
            ));
        }
        Some(Action::ClickElement) => {
            resp.script = Some(format!(
                "document.querySelector('{}').click();",
                field("selector")
            ));
        }
        Some(Action::Login) => {
            resp.script = Some(format!(
                "\n        document.querySelector('{}').value = '{}';\
                 \n        document.querySelector('{}').value = '{}';\
                 \n        document.querySelector('{}').click();\
                 \n      ",
                field("usernameSelector"),
                field("username"),
                field("passwordSelector"),
                field("password"),
                field("submitSelector"),
            ));
        }
        None => {
            resp.success = false;
            resp.message = format!("Unknown automation action: {}", action_text);
        }
    }

    resp.data = data;
    resp
}

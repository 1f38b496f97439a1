use async_trait::async_trait;
use sightline_engine::{
    AutomationError, Automator, Driver, DriverError, ElementNode, NodeRef, PageSnapshot, RawNode,
    TextNode, TextTransform,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Act {
    Click(u32),
    Clear(u32),
    Keys(u32, String),
}

/// Driver that serves a sequence of page states, one per capture, sticking
/// to the last one once the sequence is exhausted. Models a page that is
/// still rendering.
#[derive(Clone)]
struct SequenceDriver {
    states: Arc<Mutex<VecDeque<Vec<RawNode>>>>,
    last: Arc<Mutex<Vec<RawNode>>>,
    captures: Arc<Mutex<u32>>,
    actions: Arc<Mutex<Vec<Act>>>,
    fail_capture: bool,
}

impl SequenceDriver {
    fn new(states: Vec<Vec<RawNode>>) -> Self {
        let mut states: VecDeque<Vec<RawNode>> = states.into();
        let first = states.pop_front().unwrap_or_default();
        Self {
            states: Arc::new(Mutex::new(states)),
            last: Arc::new(Mutex::new(first)),
            captures: Arc::new(Mutex::new(0)),
            actions: Arc::new(Mutex::new(Vec::new())),
            fail_capture: false,
        }
    }

    fn failing() -> Self {
        let mut driver = Self::new(vec![Vec::new()]);
        driver.fail_capture = true;
        driver
    }

    fn captures(&self) -> u32 {
        *self.captures.lock().unwrap()
    }

    fn acts(&self) -> Vec<Act> {
        self.actions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Driver for SequenceDriver {
    async fn capture(&self) -> Result<PageSnapshot, DriverError> {
        *self.captures.lock().unwrap() += 1;
        if self.fail_capture {
            return Err(DriverError::Script("execution context destroyed".into()));
        }
        let mut last = self.last.lock().unwrap();
        let nodes = {
            let mut states = self.states.lock().unwrap();
            match states.pop_front() {
                Some(next) => {
                    *last = next;
                    last.clone()
                }
                None => last.clone(),
            }
        };
        Ok(PageSnapshot { nodes })
    }

    async fn click(&self, node: NodeRef) -> Result<(), DriverError> {
        self.actions.lock().unwrap().push(Act::Click(node.0));
        Ok(())
    }

    async fn clear(&self, node: NodeRef) -> Result<(), DriverError> {
        self.actions.lock().unwrap().push(Act::Clear(node.0));
        Ok(())
    }

    async fn send_keys(&self, node: NodeRef, text: &str) -> Result<(), DriverError> {
        self.actions
            .lock()
            .unwrap()
            .push(Act::Keys(node.0, text.into()));
        Ok(())
    }
}

fn element(tag: &str, display: &str, depth: u32, node: u32, parent: Option<u32>) -> ElementNode {
    ElementNode {
        tag: tag.into(),
        display: display.into(),
        depth,
        node: NodeRef(node),
        parent: parent.map(NodeRef),
        ..Default::default()
    }
}

fn body() -> RawNode {
    RawNode::Element(element("body", "block", 0, 0, None))
}

fn div(node: u32) -> RawNode {
    RawNode::Element(element("div", "block", 1, node, Some(0)))
}

fn txt(parent: u32, text: &str) -> RawNode {
    RawNode::Text(TextNode {
        depth: 2,
        parent: NodeRef(parent),
        text: text.into(),
        transform: TextTransform::None,
    })
}

fn text_input(node: u32, parent: u32, value: &str) -> RawNode {
    let mut el = element("input", "inline-block", 2, node, Some(parent));
    el.input_type = Some("text".into());
    el.value = Some(value.into());
    RawNode::Element(el)
}

/// Two "First Name" fields: one inside the applicant section (before
/// "Gender"), one in a later section.
fn two_section_page() -> Vec<RawNode> {
    vec![
        body(),
        div(1),
        txt(1, "Applicant"),
        div(2),
        txt(2, "First Name"),
        text_input(3, 2, ""),
        div(4),
        txt(4, "Gender"),
        div(5),
        txt(5, "Child Information"),
        div(6),
        txt(6, "First Name"),
        text_input(7, 6, ""),
    ]
}

fn automator(driver: SequenceDriver) -> Automator<SequenceDriver> {
    Automator::new(driver)
        .with_timeout(Duration::from_millis(80))
        .with_poll_interval(Duration::from_millis(5))
}

#[tokio::test]
async fn between_binds_the_strictly_enclosed_field() {
    let driver = SequenceDriver::new(vec![two_section_page()]);
    let auto = automator(driver.clone());
    auto.between("Applicant", "Gender")
        .set("First Name")
        .to("Joyce")
        .await
        .unwrap();
    assert_eq!(
        driver.acts(),
        vec![Act::Clear(3), Act::Keys(3, "Joyce".into())]
    );
}

#[tokio::test]
async fn after_scopes_to_the_later_occurrence() {
    let driver = SequenceDriver::new(vec![two_section_page()]);
    let auto = automator(driver.clone());
    auto.after("Child Information")
        .set("First Name")
        .to("Will")
        .await
        .unwrap();
    assert_eq!(
        driver.acts(),
        vec![Act::Clear(7), Act::Keys(7, "Will".into())]
    );
}

#[tokio::test]
async fn derived_contexts_leave_the_parent_untouched() {
    let driver = SequenceDriver::new(vec![two_section_page()]);
    let auto = automator(driver.clone());
    let child = auto.after("Child Information");
    child.set("First Name").to("Will").await.unwrap();
    // the root context still resolves the first field
    auto.set("First Name").to("Joyce").await.unwrap();
    assert_eq!(
        driver.acts(),
        vec![
            Act::Clear(7),
            Act::Keys(7, "Will".into()),
            Act::Clear(3),
            Act::Keys(3, "Joyce".into()),
        ]
    );
}

#[tokio::test]
async fn out_of_reading_order_anchors_time_out() {
    // "Applicant" precedes "Child Information"; asking for them in the
    // reverse order must fail even though both exist globally
    let driver = SequenceDriver::new(vec![two_section_page()]);
    let auto = automator(driver);
    let err = auto
        .after("Child Information")
        .string("Applicant")
        .await
        .unwrap_err();
    let AutomationError::Timeout(message) = err else {
        panic!("expected Timeout");
    };
    assert!(message.contains("Applicant"));
}

#[tokio::test]
async fn absent_key_times_out_naming_it() {
    let driver = SequenceDriver::new(vec![vec![body(), div(1), txt(1, "nothing here")]]);
    let auto = automator(driver.clone());
    let err = auto.set("Date of Birth").to("3/22/1971").await.unwrap_err();
    let AutomationError::Timeout(message) = err else {
        panic!("expected Timeout");
    };
    assert!(message.contains("Date of Birth"));
    // several attempts were made before giving up
    assert!(driver.captures() > 1);
}

#[tokio::test]
async fn late_rendered_content_resolves_within_the_budget() {
    let empty = vec![body(), div(1), txt(1, "loading...")];
    let driver = SequenceDriver::new(vec![
        empty.clone(),
        empty,
        two_section_page(),
    ]);
    let auto = Automator::new(driver.clone())
        .with_timeout(Duration::from_millis(500))
        .with_poll_interval(Duration::from_millis(5));
    auto.set("First Name").to("Joyce").await.unwrap();
    assert_eq!(
        driver.acts(),
        vec![Act::Clear(3), Act::Keys(3, "Joyce".into())]
    );
    assert!(driver.captures() >= 3);
}

#[tokio::test]
async fn driver_errors_bypass_the_retry() {
    let driver = SequenceDriver::failing();
    let auto = automator(driver.clone());
    let err = auto.set("First Name").to("Joyce").await.unwrap_err();
    assert!(matches!(err, AutomationError::Driver(_)));
    assert_eq!(driver.captures(), 1);
}

#[tokio::test]
async fn reordered_markup_with_equal_visual_order_reads_the_same() {
    // same visible text, produced by different markup
    let flat = vec![body(), div(1), txt(1, "First Name"), text_input(2, 1, "")];
    let nested = vec![
        body(),
        div(1),
        RawNode::Element(element("span", "inline", 2, 2, Some(1))),
        txt(2, "First "),
        RawNode::Element(element("span", "inline", 2, 3, Some(1))),
        txt(3, "Name"),
        text_input(4, 1, ""),
    ];
    let flat_auto = automator(SequenceDriver::new(vec![flat]));
    let nested_auto = automator(SequenceDriver::new(vec![nested]));
    let flat_content = flat_auto.content().await.unwrap();
    let nested_content = nested_auto.content().await.unwrap();
    let texts = |content: &[sightline_engine::ContentItem]| {
        content
            .iter()
            .map(|item| item.text().unwrap_or("<widget>").to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(texts(&flat_content), texts(&nested_content));
    // and resolution behaves identically
    flat_auto.set("First Name").to("Joyce").await.unwrap();
    nested_auto.set("First Name").to("Joyce").await.unwrap();
}

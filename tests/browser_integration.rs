use std::time::Duration;

use ocular::{AgentConfig, BrowserSession, Grounder, LaunchOptions};

fn test_config() -> AgentConfig {
    AgentConfig {
        navigation_settle: Duration::from_millis(300),
        dismiss_timeout: Duration::from_millis(500),
        action_settle: Duration::from_millis(200),
        scroll_settle: Duration::from_millis(200),
        ..AgentConfig::default()
    }
}

fn data_url(html: &str) -> String {
    format!("data:text/html,{}", urlencoding::encode(html))
}

fn launch() -> BrowserSession {
    BrowserSession::launch(LaunchOptions::new().headless(true), test_config())
        .expect("Failed to launch browser")
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_collects_marked_elements_in_document_order() {
    let session = launch();

    session
        .navigate(&data_url(
            "<html><body><button>One</button><a href=\"#x\">Two</a><input type=\"text\"></body></html>",
        ))
        .expect("Failed to navigate");

    let elements = session
        .interactive_elements()
        .expect("Failed to collect elements");

    assert_eq!(elements.len(), 3);
    let ids: Vec<u32> = elements.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    let tags: Vec<&str> = elements.iter().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, vec!["button", "a", "input"]);
    assert!(elements.iter().all(|e| e.width > 0.0 && e.height > 0.0));
}

#[test]
#[ignore]
fn test_click_at_reaches_the_element_under_the_point() {
    let session = launch();

    session
        .navigate(&data_url(
            "<html><body><button onclick=\"this.remove()\">Vanish</button></body></html>",
        ))
        .expect("Failed to navigate");

    let elements = session
        .interactive_elements()
        .expect("Failed to collect elements");
    assert_eq!(elements.len(), 1);

    let (x, y) = elements[0].center();
    session.click_at(x, y).expect("Failed to click");
    std::thread::sleep(Duration::from_millis(300));

    let after = session
        .interactive_elements()
        .expect("Failed to collect elements");
    assert!(after.is_empty(), "The clicked button should be gone");
}

#[test]
#[ignore]
fn test_navigation_sweeps_close_popups() {
    let session = launch();

    // A blocking overlay with a Close button, plus real content behind it.
    let html = "<html><body>\
                <div id=\"overlay\"><button onclick=\"document.getElementById('overlay').remove()\">Close</button></div>\
                <a href=\"#content\">Content link</a>\
                </body></html>";

    session.navigate(&data_url(html)).expect("Failed to navigate");

    // The post-navigation sweep should have clicked the Close button away.
    let elements = session
        .interactive_elements()
        .expect("Failed to collect elements");
    assert!(
        elements.iter().all(|e| e.tag != "button"),
        "Close button should have been dismissed, found: {:?}",
        elements
    );
    assert!(elements.iter().any(|e| e.tag == "a"));
}

#[test]
#[ignore]
fn test_grounder_produces_a_marked_overlay_and_artifact() {
    let artifacts = std::env::temp_dir().join("ocular-grounding-test");
    let config = AgentConfig {
        artifacts_dir: artifacts.clone(),
        ..test_config()
    };
    let session = BrowserSession::launch(LaunchOptions::new().headless(true), config.clone())
        .expect("Failed to launch browser");

    session
        .navigate(&data_url(
            "<html><body><button>Press</button><input type=\"text\"></body></html>",
        ))
        .expect("Failed to navigate");

    let mut grounder = Grounder::new(&config);
    let observation = grounder.observe(&session).expect("Failed to observe");

    assert_eq!(observation.epoch(), 1);
    assert!(observation.element_count() >= 2);
    assert_ne!(observation.overlay(), observation.screenshot());

    // Both images decode as PNG.
    image::load_from_memory(observation.screenshot()).expect("screenshot decodes");
    image::load_from_memory(observation.overlay()).expect("overlay decodes");

    assert!(artifacts.join("som_debug.png").exists());
    std::fs::remove_dir_all(&artifacts).ok();
}

#[test]
#[ignore]
fn test_typing_and_scroll_keys() {
    let session = launch();

    session
        .navigate(&data_url("<html><body><input autofocus></body></html>"))
        .expect("Failed to navigate");

    session.type_text("hi there").expect("Failed to type");
    session.press_key("Enter").expect("Failed to press Enter");
    session.press_key("PageDown").expect("Failed to page down");
    session.press_key("End").expect("Failed to press End");
}

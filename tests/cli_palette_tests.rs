//! End-to-end tests for `kittencaps update-icon-palettes` command.

mod fixtures;
use fixtures::*;

#[test]
fn test_update_icon_palettes_is_idempotent() {
    let project = TestProject::new();

    let output = project.run(&["update-icon-palettes", "--json"]);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        stderr(&output)
    );
    let result: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(result["checked"], 1);
    assert_eq!(result["changed"].as_array().unwrap().len(), 1);

    let first = project.read("assets/icons/[dot].svg");
    assert!(first.contains("stop-color:#EEEEEE;"));
    assert!(first.contains("id=\"fg_main\""));

    let output = project.run(&["update-icon-palettes"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Checked 1 icons, 0 changed"));
    assert_eq!(project.read("assets/icons/[dot].svg"), first);
}

#[test]
fn test_update_icon_palettes_pattern_filters_icons() {
    let project = TestProject::new();
    project.write("assets/icons/[arrow-up].svg", ICON);

    let output = project.run(&["update-icon-palettes", "arrow*", "--json"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let result: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(result["checked"], 1);
    assert!(project.read("assets/icons/[dot].svg").contains("stop-color:#000000;"));
}

#[test]
fn test_update_icon_palettes_invalid_theme() {
    let project = TestProject::new();
    project.write("broken.json", THEME_WITHOUT_FONT);

    let output = project.run(&["update-icon-palettes", "--theme", "broken.json"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(project.read("assets/icons/[dot].svg").contains("stop-color:#000000;"));
}

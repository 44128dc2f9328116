use pretty_assertions::assert_eq;

use uvm_core::{Journey, JourneyTemplate, Step, SubUiVersionByCondition};
use uvm_viz::{JourneyRenderer, PlantUmlRenderer, RenderConfig};

fn journey(to: i64, flow_type: &str, description: &str, steps: Vec<Step>) -> Journey {
    Journey {
        id: Journey::journey_id(9054, to),
        flow_type: flow_type.into(),
        from_config_id: 9054,
        to_config_id: to,
        active: true,
        condition: if to == 9054 {
            String::new()
        } else {
            "flow_routing_condition == true".into()
        },
        description: description.into(),
        steps,
    }
}

fn template() -> JourneyTemplate {
    JourneyTemplate {
        search_value: 9054,
        search_type: "lender_config_id".into(),
        related_config_ids: vec![9095, 9200],
        journeys: vec![
            journey(9054, "normal", "Normal flow", vec![Step::baseline(0, "otp", "v9.1.5.0")]),
            journey(
                9095,
                "normal_to_auto_pcb",
                "Automated flow",
                vec![Step {
                    sub_ui_version_by_conditions: vec![SubUiVersionByCondition {
                        condition: "communication_call=success, lead_source=organic".into(),
                        sub_ui_version: "v1.1-auto".into(),
                    }],
                    ..Step::baseline(0, "inform.success", "v9.2.0.0")
                }],
            ),
            journey(
                9200,
                "normal_to_rejection",
                "Rejection flow",
                vec![
                    Step::baseline(0, "ekyc.selfie.flash", "v9.0.0.0"),
                    Step::baseline(1, "failure", "v9.0.0.0"),
                ],
            ),
        ],
    }
}

#[test]
fn test_journey_flow_nodes_and_arrows() {
    let puml = PlantUmlRenderer::new().journey_flow(&template());

    assert!(puml.starts_with("@startuml\n"));
    assert!(puml.ends_with("@enduml\n"));
    assert!(puml.contains("title Journey Flow Analysis - Config 9054"));
    assert!(puml.contains("rectangle \"Config 9054\\n(Source)\" as config_9054"));
    assert!(puml.contains("rectangle \"Config 9095\\nAutomated flow\" as config_9095 $WARNING"));
    assert!(puml.contains("rectangle \"Config 9200\\nRejection flow\" as config_9200 $DANGER"));

    let arrows: Vec<&str> = puml.lines().filter(|l| l.contains("-->")).collect();
    assert_eq!(
        arrows,
        vec![
            "config_9054 --> config_9095 : normal_to_auto_pcb",
            "config_9054 --> config_9200 : normal_to_rejection",
        ]
    );
}

#[test]
fn test_journey_steps_branches_on_conditions() {
    let template = template();
    let puml = PlantUmlRenderer::new().journey_steps(&template.journeys[1]);

    assert!(puml.contains("title Journey Steps - from_9054_to_9095 - Automated flow"));
    assert!(puml.contains(
        "if (communication_call=success and lead_source=organic?) then (yes)\n  :Use UI Version\\nv1.1-auto;"
    ));
    assert!(puml.contains("Condition: flow_routing_condition == true"));

    let self_loop = PlantUmlRenderer::new().journey_steps(&template.journeys[0]);
    assert!(!self_loop.contains("Condition:"));
    assert!(self_loop.contains(":Step 0: otp\\nUI Version: v9.1.5.0;"));
}

#[test]
fn test_summary() {
    let renderer = JourneyRenderer::new(RenderConfig::default());
    let expected = "\
Config 9054 (3 journeys)
  from_9054_to_9054   1 steps  Normal flow
  from_9054_to_9095   1 steps  Automated flow
  from_9054_to_9200   2 steps  Rejection flow";
    assert_eq!(renderer.render_summary(&template()), expected);

    let compact = JourneyRenderer::new(RenderConfig::compact());
    assert_eq!(
        compact.render_summary(&template()),
        "Config 9054: 3 journeys, 2 related"
    );
}

//! Quick benchmark to verify classification and substitution stay cheap
//! enough to run on every keystroke

use std::time::Instant;

use indexmap::IndexMap;
use promptor::{check_publishable, classify, substitute, FormState, KnownRefs};

fn main() {
    let known: KnownRefs = ["employee_name", "role", "work_performance", "example_eval_1"]
        .into_iter()
        .collect();

    let mut form = FormState::new();
    form.set("employee_name", "Ada Lovelace");
    form.set("role", "Engineer");
    form.set("work_performance", "Consistently exceeds expectations.");

    let fragments: IndexMap<String, String> = [(
        "example_eval_1".to_string(),
        "Example: a thorough, specific evaluation.".to_string(),
    )]
    .into_iter()
    .collect();

    let long = "Evaluate {{employee_name}} as {{role}}. {{work_performance}} ".repeat(200);

    // Test templates of varying complexity
    let templates = vec![
        "Simple text with no placeholders".to_string(),
        "Evaluate {{employee_name}}".to_string(),
        "{{employee_name}} ({{role}}): {{work_performance}}\n{{example_eval_1}}".to_string(),
        "Known {{employee_name}} and unknown {{manager}} {{ and stray braces }".to_string(),
        long,
    ];

    println!("Template Classification / Substitution");
    println!("======================================\n");

    for template in &templates {
        let iterations: u32 = if template.len() > 1000 { 1_000 } else { 100_000 };
        let label: String = template.chars().take(50).collect();

        let start = Instant::now();
        for _ in 0..iterations {
            let _ = classify(template, &known).count();
        }
        let classify_elapsed = start.elapsed();

        let start = Instant::now();
        for _ in 0..iterations {
            let _ = check_publishable(template, &known);
        }
        let gate_elapsed = start.elapsed();

        let start = Instant::now();
        for _ in 0..iterations {
            let _ = substitute(template, &form, &fragments);
        }
        let substitute_elapsed = start.elapsed();

        println!("Template: {:60} ({} bytes)", format!("\"{}\"", label), template.len());
        println!("  classify:    {:?} / op", classify_elapsed / iterations);
        println!("  publishable: {:?} / op", gate_elapsed / iterations);
        println!("  substitute:  {:?} / op\n", substitute_elapsed / iterations);
    }
}

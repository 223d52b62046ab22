//! String template rendering utilities.

pub struct TemplateVars;

impl TemplateVars {
    pub const SOLUTION: &'static str = "solution";
    pub const SERVICE: &'static str = "service";
    pub const SERVICE_KEBAB: &'static str = "serviceKebab";
    pub const SERVICES_DIR: &'static str = "servicesDir";
}

/// Replace every `{{key}}` placeholder with its value.
pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_all_placeholders() {
        let out = render(
            "Projects.{{solution}}_{{service}}Service_ {{solution}}",
            &[(TemplateVars::SOLUTION, "PlayTicket"), (TemplateVars::SERVICE, "Order")],
        );
        assert_eq!(out, "Projects.PlayTicket_OrderService_ PlayTicket");
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        assert_eq!(render("{{other}}", &[("solution", "X")]), "{{other}}");
    }
}

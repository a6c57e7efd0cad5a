use devx_types::ConfigValue;

/// Walk the whole component and describe every node that keeps it from
/// being concrete, as `<path>: <message>`.
///
/// A node carrying an evaluation error reports that error; other leaves
/// report their concreteness failure. Containers are not reported on their
/// own since their failures are exactly those of their leaves.
pub fn collect_concreteness_errors(component: &ConfigValue) -> Vec<String> {
    let mut errors = Vec::new();
    component.walk(&mut |_| true, &mut |node: &ConfigValue| {
        if let Some(err) = node.err() {
            errors.push(format!("{}: {}", node.path().describe(), err));
            return;
        }
        if !node.is_leaf() {
            return;
        }
        if let Err(err) = node.validate_concrete() {
            errors.push(format!("{}: {}", node.path().describe(), err));
        }
    });
    errors
}

use super::{collect_concreteness_errors, StackBuilder};
use crate::core::error::AppError;
use crate::core::progress::ProgressReporter;
use crate::core::stack::Stack;
use crate::core::types::ErrorCategory;

impl StackBuilder {
    /// Merge this environment's additional components into `stack`, then run
    /// every flow over every component in dependency order, returning that
    /// order.
    ///
    /// A component is written back to the stack only once it is concrete, so
    /// on failure the stack keeps every component committed before the
    /// failing one and nothing after it.
    pub fn transform_stack(
        &self,
        stack: &mut Stack,
        progress: &mut dyn ProgressReporter,
    ) -> Result<Vec<String>, AppError> {
        if let Some(overlay) = &self.additional_components {
            stack.add_components(overlay)?;
        }

        let ordered = stack.ordered_components()?;
        let total = (ordered.len() * self.pipeline_units()) as u64;
        tracing::info!(
            components = ordered.len(),
            flows = self.flows.len(),
            total,
            "transforming stack"
        );

        progress.start(total, "Transforming stack");
        let result = self.transform_components(stack, &ordered, progress);
        progress.finish();

        if let Err(err) = &result {
            tracing::warn!(code = %err.code, "stack transformation failed: {}", err.message);
        }
        result.map(|()| ordered)
    }

    fn transform_components(
        &self,
        stack: &mut Stack,
        ordered: &[String],
        progress: &mut dyn ProgressReporter,
    ) -> Result<(), AppError> {
        for id in ordered {
            let mut component = stack.get_component(id)?;

            for flow in &self.flows {
                component = flow.run(stack, id, component)?;
                if !stack.has_concrete_resource_drivers(&component) {
                    return Err(AppError::new(
                        ErrorCategory::DriverError,
                        format!("component {} resources do not have concrete drivers", id),
                    )
                    .with_code("TRANSFORM-DRIVER-001")
                    .with_suggestion(
                        "give every entry under `$resources` a `driver` the build knows about",
                    ));
                }
                progress.advance(flow.pipeline_len() as u64);
            }

            if !stack.is_concrete_component(&component) {
                let errors = collect_concreteness_errors(&component);
                let mut err = AppError::new(
                    ErrorCategory::ConcretenessError,
                    format!(
                        "component {} is not concrete after transformation:\n  {}",
                        id,
                        errors.join("\n  ")
                    ),
                )
                .with_code("TRANSFORM-CONCRETE-001");
                err.add_context("component", id);
                return Err(err);
            }

            tracing::debug!(component = %id, "component committed");
            stack.update_component(id, component);
        }
        Ok(())
    }
}

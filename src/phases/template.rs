//! Configuration templating of string properties.

use minijinja::{Environment, UndefinedBehavior, value::Value};

use crate::config::ConfigStore;
use crate::graph::ModuleGraph;
use crate::module::TargetType;
use crate::properties::{MergeError, PropertyBag, PropertyValue};

use super::{ResolveError, StepErrors};

/// Render every templated string in core and host/target bags against the
/// configuration.
///
/// Only strings containing `{{` or `{%` are rendered. Undefined names are
/// errors.
///
/// # Errors
///
/// Returns [`ResolveError::Properties`] listing every string that failed to
/// render.
pub fn expand_templates(graph: &mut ModuleGraph, config: &ConfigStore) -> Result<(), ResolveError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    let context = Value::from_serialize(config);
    let expander = Expander { env, context };

    let mut errors = StepErrors::new("template expansion");
    for index in graph.indices() {
        let Some(module) = graph.module_mut(index) else {
            continue;
        };
        let mut failures = Vec::new();
        for bag in module.bags_mut() {
            expander.expand_bag(bag, "", &mut failures);
        }
        if let Some(pair) = module.target_specific_mut() {
            for variant in TargetType::ALL {
                for bag in &mut pair.get_mut(variant).bags {
                    expander.expand_bag(bag, variant.as_str(), &mut failures);
                }
            }
        }
        errors.record_all(module.name(), failures)?;
    }
    errors.finish()
}

struct Expander {
    env: Environment<'static>,
    context: Value,
}

impl Expander {
    fn expand_bag(&self, bag: &mut PropertyBag, scope: &str, failures: &mut Vec<MergeError>) {
        for (field, value) in bag.iter_mut() {
            let result = match value {
                PropertyValue::Str(Some(text)) => self.expand(text),
                PropertyValue::List(items) => items.iter_mut().try_for_each(|item| self.expand(item)),
                PropertyValue::Str(None) | PropertyValue::Bool(_) => Ok(()),
            };
            if let Err(err) = result {
                let field_error = MergeError::field(field, err.to_string());
                failures.push(if scope.is_empty() {
                    field_error
                } else {
                    field_error.scoped(scope)
                });
            }
        }
    }

    fn expand(&self, text: &mut String) -> Result<(), minijinja::Error> {
        if !is_template(text) {
            return Ok(());
        }
        let rendered = self.env.render_str(text, &self.context)?;
        *text = rendered;
        Ok(())
    }
}

fn is_template(text: &str) -> bool {
    text.contains("{{") || text.contains("{%")
}

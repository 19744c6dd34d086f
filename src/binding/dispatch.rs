//! Parameter binder dispatch.
//!
//! For each formal parameter, in declaration order:
//! ```text
//! builtin type and routed value of that name → the raw routed value
//! named type  → container instance → model binder → bound instance
//! no usable type → absent
//! ```
//! A builtin parameter with no routed value cannot be resolved and fails the
//! request, unless it is declared optional.

use crate::binding::args::{Argument, Arguments};
use crate::binding::param::{Param, ParamType};
use crate::binding::registry::{BindContext, BindTarget, BinderRegistry};
use crate::container::ContainerError;
use crate::mvc::DispatchError;

pub fn bind_arguments(
    parameters: &[Param],
    context: &BindContext<'_>,
    binders: &BinderRegistry,
) -> Result<Arguments, DispatchError> {
    let mut arguments = Arguments::new();
    for param in parameters {
        let argument = bind_parameter(param, context, binders)?;
        arguments.push(param.name(), argument);
    }
    Ok(arguments)
}

fn bind_parameter(
    param: &Param,
    context: &BindContext<'_>,
    binders: &BinderRegistry,
) -> Result<Argument, DispatchError> {
    let name = param.name();
    match param.ty() {
        ParamType::Primitive(primitive) => match context.spec.parameter(name) {
            Some(value) => Ok(Argument::Value(value.clone())),
            None if param.is_optional() => Ok(Argument::Absent),
            None => Err(DispatchError::ParameterResolution {
                parameter: name.to_string(),
                source: ContainerError::Unresolvable {
                    service: primitive.name().to_string(),
                },
            }),
        },
        ParamType::Named(ty) => {
            let instance = context
                .container
                .resolve_or(&ty.key(), ty.name(), ty.construct())
                .map_err(|source| DispatchError::ParameterResolution {
                    parameter: name.to_string(),
                    source,
                })?;

            let bound = binders
                .get(ty.id())
                .bind(BindTarget { instance, ty }, name, context)
                .map_err(|source| DispatchError::Binding {
                    parameter: name.to_string(),
                    source,
                })?;
            Ok(Argument::Instance(bound))
        }
        ParamType::Unnamed => Ok(Argument::Absent),
    }
}

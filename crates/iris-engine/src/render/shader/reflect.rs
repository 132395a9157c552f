use std::collections::BTreeSet;

use naga::{AddressSpace, Binding, ScalarKind, TypeInner, VectorSize};

use super::{StageKind, TEXTURE_GROUP, UNIFORM_GROUP};

/// Host-visible type of a uniform block member.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Int,
    Uint,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    /// Bytes written for a value of this kind (excluding trailing padding).
    pub const fn size(self) -> u32 {
        match self {
            UniformKind::Int | UniformKind::Uint | UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Mat4 => 64,
        }
    }

    fn from_inner(inner: &TypeInner) -> Option<Self> {
        match *inner {
            TypeInner::Scalar(s) if s.width == 4 => match s.kind {
                ScalarKind::Sint => Some(UniformKind::Int),
                ScalarKind::Uint => Some(UniformKind::Uint),
                ScalarKind::Float => Some(UniformKind::Float),
                _ => None,
            },
            TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float && scalar.width == 4 => {
                Some(match size {
                    VectorSize::Bi => UniformKind::Vec2,
                    VectorSize::Tri => UniformKind::Vec3,
                    VectorSize::Quad => UniformKind::Vec4,
                })
            }
            TypeInner::Matrix {
                columns: VectorSize::Quad,
                rows: VectorSize::Quad,
                scalar,
            } if scalar.kind == ScalarKind::Float && scalar.width == 4 => Some(UniformKind::Mat4),
            _ => None,
        }
    }
}

/// One named member of a uniform block.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformMember {
    pub name: String,
    pub offset: u32,
    pub kind: UniformKind,
}

/// Reflected layout of a program's uniform block.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformBlock {
    /// Size of the block in bytes, including trailing padding.
    pub size: u32,
    pub members: Vec<UniformMember>,
}

impl UniformBlock {
    pub fn member(&self, name: &str) -> Option<&UniformMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// What linking needs to know about one compiled stage.
#[derive(Debug, Default)]
pub(super) struct StageReflection {
    pub entry_point: String,
    pub uniform_block: Option<UniformBlock>,
    /// User `@location`s read by the entry point.
    pub inputs: BTreeSet<u32>,
    /// User `@location`s written by the entry point.
    pub outputs: BTreeSet<u32>,
    pub samples_texture: bool,
}

/// Extracts entry point, IO locations and resource bindings from a validated module.
///
/// Errors are link-level diagnostics (plain messages).
pub(super) fn reflect_stage(module: &naga::Module, kind: StageKind) -> Result<StageReflection, String> {
    let ep = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == kind.naga_stage())
        .ok_or_else(|| format!("no {kind} entry point found"))?;

    let mut out = StageReflection {
        entry_point: ep.name.clone(),
        ..Default::default()
    };

    for arg in &ep.function.arguments {
        collect_locations(module, arg.ty, arg.binding.as_ref(), &mut out.inputs);
    }
    if let Some(result) = &ep.function.result {
        collect_locations(module, result.ty, result.binding.as_ref(), &mut out.outputs);
    }

    let mut texture_seen = false;
    let mut sampler_seen = false;

    for (_, var) in module.global_variables.iter() {
        let name = var.name.as_deref().unwrap_or("<unnamed>");
        match var.space {
            AddressSpace::Uniform => {
                let binding = var.binding.as_ref().map(|b| (b.group, b.binding));
                if binding != Some((UNIFORM_GROUP, 0)) {
                    return Err(format!(
                        "{kind} uniform `{name}` must be bound at @group({UNIFORM_GROUP}) @binding(0)"
                    ));
                }
                if out.uniform_block.is_some() {
                    return Err(format!("{kind} stage declares more than one uniform block"));
                }
                out.uniform_block = Some(uniform_block(module, var.ty, name)?);
            }
            AddressSpace::Handle => {
                let binding = var.binding.as_ref().map(|b| (b.group, b.binding));
                match &module.types[var.ty].inner {
                    TypeInner::Image { .. } => {
                        if binding != Some((TEXTURE_GROUP, 0)) {
                            return Err(format!(
                                "{kind} texture `{name}` must be bound at @group({TEXTURE_GROUP}) @binding(0)"
                            ));
                        }
                        texture_seen = true;
                    }
                    TypeInner::Sampler { .. } => {
                        if binding != Some((TEXTURE_GROUP, 1)) {
                            return Err(format!(
                                "{kind} sampler `{name}` must be bound at @group({TEXTURE_GROUP}) @binding(1)"
                            ));
                        }
                        sampler_seen = true;
                    }
                    _ => return Err(format!("{kind} resource `{name}` has an unsupported type")),
                }
            }
            _ => {}
        }
    }

    if texture_seen != sampler_seen {
        return Err(format!("{kind} stage must declare a texture and its sampler together"));
    }
    out.samples_texture = texture_seen;

    Ok(out)
}

fn uniform_block(module: &naga::Module, ty: naga::Handle<naga::Type>, var_name: &str) -> Result<UniformBlock, String> {
    let ty = &module.types[ty];
    match &ty.inner {
        TypeInner::Struct { members, span } => {
            let members = members
                .iter()
                .map(|m| {
                    let name = m.name.clone().unwrap_or_default();
                    let kind = UniformKind::from_inner(&module.types[m.ty].inner)
                        .ok_or_else(|| format!("uniform member `{name}` has an unsupported type"))?;
                    Ok(UniformMember { name, offset: m.offset, kind })
                })
                .collect::<Result<Vec<_>, String>>()?;
            Ok(UniformBlock { size: *span, members })
        }
        // A bare `var<uniform> x: T` is a one-member block named after the variable.
        inner => {
            let kind = UniformKind::from_inner(inner)
                .ok_or_else(|| format!("uniform `{var_name}` has an unsupported type"))?;
            Ok(UniformBlock {
                size: inner.size(module.to_ctx()).next_multiple_of(16),
                members: vec![UniformMember {
                    name: var_name.to_string(),
                    offset: 0,
                    kind,
                }],
            })
        }
    }
}

fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut BTreeSet<u32>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.insert(*location);
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_locations(module, m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

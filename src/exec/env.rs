use std::collections::HashMap;

use smol_str::SmolStr;

use crate::{
    error::{TraceFrame, Traceback},
    exec::Number,
    span::Position,
};

/// Handle to a [`Scope`] stored in an [`Env`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// Handle to a [`Frame`] stored in an [`Env`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(usize);

/// Name to value bindings, chained to an enclosing scope for lookup only.
#[derive(Debug, Default)]
pub struct Scope {
    values: HashMap<SmolStr, Number>,
    enclose: Option<ScopeId>,
}

/// One evaluation frame: a scope plus where it was entered from.
#[derive(Debug)]
pub struct Frame {
    pub name: SmolStr,
    pub scope: ScopeId,
    pub parent: Option<FrameId>,
    /// Call site inside `parent`.
    pub entry: Option<Position>,
}

/// Arena owning every scope and frame of a session. Links between them are
/// indices, so nothing here is reference counted.
#[derive(Debug, Default)]
pub struct Env {
    scopes: Vec<Scope>,
    frames: Vec<Frame>,
}

impl Env {
    pub fn new_scope(&mut self, enclose: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope {
            values: HashMap::default(),
            enclose,
        });
        ScopeId(self.scopes.len() - 1)
    }

    /// Creates a frame without a parent, owning a fresh top-level scope.
    pub fn root_frame(&mut self, name: &str) -> FrameId {
        let scope = self.new_scope(None);
        self.push_frame(Frame {
            name: name.into(),
            scope,
            parent: None,
            entry: None,
        })
    }

    /// Creates a frame entered from `parent` at `entry`. Its scope encloses
    /// the parent's, so outer names stay visible.
    pub fn enter_frame(&mut self, name: &str, parent: FrameId, entry: Position) -> FrameId {
        let scope = self.new_scope(Some(self.frame(parent).scope));
        self.push_frame(Frame {
            name: name.into(),
            scope,
            parent: Some(parent),
            entry: Some(entry),
        })
    }

    pub fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id.0]
    }

    /// Looks `name` up in `scope`, then in each enclosing scope.
    pub fn get(&self, scope: ScopeId, name: &str) -> Option<&Number> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            if let Some(v) = scope.values.get(name) {
                return Some(v);
            }
            current = scope.enclose;
        }

        None
    }

    /// Binds `name` in `scope` itself; enclosing scopes are never touched.
    pub fn set(&mut self, scope: ScopeId, name: &str, value: Number) {
        self.scopes[scope.0].values.insert(name.into(), value);
    }

    /// Unbinds `name` from `scope` itself. Removing an unbound name does
    /// nothing and returns `None`.
    pub fn remove(&mut self, scope: ScopeId, name: &str) -> Option<Number> {
        self.scopes[scope.0].values.remove(name)
    }

    /// Frames from the outermost down to `frame`. `at` is the position
    /// reached inside `frame`; outer frames report their call sites.
    pub fn traceback(&self, frame: FrameId, at: Position) -> Traceback {
        let mut frames = vec![];
        let mut pos = Some(at);
        let mut current = Some(frame);

        while let (Some(id), Some(line)) = (current, pos.map(|p| p.line)) {
            let frame = self.frame(id);
            frames.push(TraceFrame {
                line,
                name: frame.name.clone(),
            });
            pos = frame.entry;
            current = frame.parent;
        }

        frames.reverse();
        Traceback { frames }
    }
}

impl Env {
    fn push_frame(&mut self, frame: Frame) -> FrameId {
        self.frames.push(frame);
        FrameId(self.frames.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::exec::Num;

    fn int(n: i64) -> Number {
        Number::new(Num::Int(n))
    }

    #[test]
    fn lookup_walks_enclosing_scopes() {
        let mut env = Env::default();
        let outer = env.new_scope(None);
        let inner = env.new_scope(Some(outer));

        env.set(outer, "x", int(1));
        assert_eq!(env.get(inner, "x").map(|n| n.value), Some(Num::Int(1)));
        assert!(env.get(outer, "y").is_none());
    }

    #[test]
    fn set_only_binds_locally() {
        let mut env = Env::default();
        let outer = env.new_scope(None);
        let inner = env.new_scope(Some(outer));

        env.set(outer, "x", int(1));
        env.set(inner, "x", int(2));
        assert_eq!(env.get(inner, "x").map(|n| n.value), Some(Num::Int(2)));
        assert_eq!(env.get(outer, "x").map(|n| n.value), Some(Num::Int(1)));
    }

    #[test]
    fn remove_is_local_and_tolerates_missing_names() {
        let mut env = Env::default();
        let outer = env.new_scope(None);
        let inner = env.new_scope(Some(outer));

        env.set(outer, "x", int(1));
        assert!(env.remove(inner, "x").is_none());
        assert!(env.remove(outer, "x").is_some());
        assert!(env.get(inner, "x").is_none());
        assert!(env.remove(outer, "x").is_none());
    }

    #[test]
    fn traceback_runs_outer_to_inner() {
        let mut env = Env::default();
        let root = env.root_frame("<program>");
        let child = env.enter_frame("child", root, Position::new(10, 2, 0));

        let tb = env.traceback(child, Position::new(3, 0, 3));
        assert_eq!(
            tb.frames,
            vec![
                TraceFrame {
                    line: 2,
                    name: "<program>".into()
                },
                TraceFrame {
                    line: 0,
                    name: "child".into()
                },
            ]
        );
    }

    #[test]
    fn child_frame_sees_parent_names() {
        let mut env = Env::default();
        let root = env.root_frame("<program>");
        let child = env.enter_frame("child", root, Position::default());

        env.set(env.frame(root).scope, "x", int(5));
        let scope = env.frame(child).scope;
        assert_eq!(env.get(scope, "x").map(|n| n.value), Some(Num::Int(5)));
    }
}

use crate::ecs::{component::Component, entity::Entity, world::World};

/// A set of component values attached to an entity in one step, as by
/// [`World::spawn`](World::spawn).
///
/// Implemented for every component, for `()` and for (nested) tuples of values:
///
/// ```rust,ignore
/// world.spawn(Position::default());
/// world.spawn((Position::default(), (Velocity::default(), Mass(1.0))));
/// ```
///
/// When a set names the same component type twice the last value wins.
pub trait Values: 'static {
    /// Attach every value in the set to `entity`.
    fn attach(self, world: &mut World, entity: Entity);
}

impl<C: Component> Values for C {
    #[inline]
    fn attach(self, world: &mut World, entity: Entity) {
        world.add(entity, self);
    }
}

impl Values for () {
    #[inline]
    fn attach(self, _world: &mut World, _entity: Entity) {}
}

macro_rules! tuple_values {
    ($($name: ident),*) => {
        impl<$($name: Values),*> Values for ($($name,)*) {
            #[allow(non_snake_case)]
            fn attach(self, world: &mut World, entity: Entity) {
                let ($($name,)*) = self;
                $( $name.attach(world, entity); )*
            }
        }
    }
}

crate::all_tuples!(tuple_values);

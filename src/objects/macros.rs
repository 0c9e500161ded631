//! Declarative helpers shared by the object modules.

/// Declares a builder for an entity.
///
/// The builder has one public `Option` field per required and optional
/// entity field (assigning `None` unsets it) plus plain collection fields
/// that the parser appends to. `into_entity` checks every required field,
/// runs the optional `validate` hook, calls `construct` with the required
/// values in declaration order and then moves the optional and collection
/// fields onto the entity.
macro_rules! entity_builder {
    (
        $(#[$meta:meta])*
        $builder:ident => $entity:ident {
            required { $($req:ident: $req_ty:ty),* $(,)? }
            optional { $($opt:ident: $opt_ty:ty),* $(,)? }
            collections { $($coll:ident: $coll_ty:ty),* $(,)? }
            construct: $ctor:expr,
            $(validate: $check:expr,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $builder {
            $(
                #[allow(missing_docs)]
                pub $req: Option<$req_ty>,
            )*
            $(
                #[allow(missing_docs)]
                pub $opt: Option<$opt_ty>,
            )*
            $(
                #[allow(missing_docs)]
                pub $coll: $coll_ty,
            )*
        }

        impl $builder {
            /// Creates a builder with every field unset.
            pub fn new() -> Self {
                Self::default()
            }

            /// Restores every field to unset.
            pub fn reset(&mut self) {
                *self = Self::default();
            }

            /// Validates the collected fields and constructs the entity,
            /// leaving the builder untouched.
            pub fn build(&self) -> $crate::error::Result<$entity> {
                self.clone().into_entity()
            }

            /// Validates the collected fields and constructs the entity.
            pub fn into_entity(self) -> $crate::error::Result<$entity> {
                $( ($check)(&self)?; )?
                $(
                    let $req = self.$req.ok_or($crate::error::Error::MissingField {
                        entity: stringify!($entity),
                        field: stringify!($req),
                    })?;
                )*
                #[allow(unused_mut)]
                let mut entity = ($ctor)($($req),*);
                $( entity.$opt = self.$opt; )*
                $( entity.$coll = self.$coll; )*
                Ok(entity)
            }
        }
    };
}

/// Implements `DocumentAware` for a type with a private `document` field,
/// cascading to the listed child containers.
macro_rules! document_aware {
    ($ty:ty $(=> $($child:ident),+)?) => {
        impl $crate::objects::DocumentAware for $ty {
            fn document(&self) -> Option<$crate::objects::DocumentId> {
                self.document
            }

            fn set_document(
                &mut self,
                document: Option<$crate::objects::DocumentId>,
                #[allow(unused_variables)] seal: $crate::objects::Seal,
            ) {
                self.document = document;
                $($( $crate::objects::DocumentAware::set_document(&mut self.$child, document, seal); )+)?
            }
        }
    };
}

/// Declares read accessors and re-attaching editors for owned child slots.
///
/// For each `field / update: Type` pair this generates `field(&self) ->
/// &Type` and `update(&mut self, edit) -> R`, which runs `edit` on the slot
/// and then attaches the slot to the element's own document. The type must
/// have a private `document` field.
macro_rules! owned_fields {
    ($ty:ty { $($(#[$meta:meta])* $field:ident / $update:ident: $field_ty:ty),+ $(,)? }) => {
        impl $ty {
            $(
                $(#[$meta])*
                pub fn $field(&self) -> &$field_ty {
                    &self.$field
                }

                #[doc = concat!("Edits `", stringify!($field), "` in place, then attaches it to this element's document.")]
                pub fn $update<R>(&mut self, edit: impl FnOnce(&mut $field_ty) -> R) -> R {
                    $crate::objects::edit_attached(&mut self.$field, self.document, edit)
                }
            )+
        }
    };
}

/// Implements `Element` for a type with `id` and `name` fields (and `sid`
/// when requested).
macro_rules! impl_element {
    ($ty:ty) => {
        impl $crate::objects::Element for $ty {
            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn name(&self) -> Option<&str> {
                self.name.as_deref()
            }
        }
    };
    ($ty:ty, sid) => {
        impl $crate::objects::Element for $ty {
            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn sid(&self) -> Option<&str> {
                self.sid.as_deref()
            }

            fn name(&self) -> Option<&str> {
                self.name.as_deref()
            }
        }
    };
}

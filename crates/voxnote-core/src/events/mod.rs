//! Publish/subscribe: an untyped, name-keyed [`EventBus`] and the
//! [`TypedEvents`] façade that fixes each event's payload type per catalog.

mod bus;
mod typed;

pub use {
    bus::{EventBus, Listener, ListenerId},
    typed::{Event, Subscription, TypedEvents},
};

/// Declares an event catalog: a marker type for the catalog plus one marker
/// type per event, each bound to its payload type and bus name.
///
/// ```
/// voxnote_core::event_catalog! {
///     /// Events of a toy counter.
///     pub CounterEvents {
///         /// The counter changed.
///         Changed(u32) = "changed";
///         /// The counter was reset.
///         Reset(()) = "reset";
///     }
/// }
///
/// let events = voxnote_core::TypedEvents::<CounterEvents>::new();
/// events.subscribe::<Changed, _>(|value: &u32| println!("now {value}"));
/// events.emit::<Changed>(&3);
/// ```
#[macro_export]
macro_rules! event_catalog {
    (
        $(#[$catalog_meta:meta])*
        $vis:vis $catalog:ident {
            $(
                $(#[$event_meta:meta])*
                $event:ident($payload:ty) = $name:literal;
            )*
        }
    ) => {
        $(#[$catalog_meta])*
        #[derive(Debug)]
        $vis enum $catalog {}

        $(
            $(#[$event_meta])*
            #[derive(Debug)]
            $vis enum $event {}

            impl $crate::Event for $event {
                type Catalog = $catalog;
                type Payload = $payload;
                const NAME: &'static str = $name;
            }
        )*
    };
}

/// Declares the closed set of events a contract emits.
///
/// Generates the enum (one `Decoded<_>` variant per event), catalog helpers
/// and a `DecodeLog` impl that dispatches on topics[0]. Variant names are the
/// event type names.
macro_rules! event_set {
    (
        $(#[$meta:meta])*
        $vis:vis enum $set:ident ($contract:literal) {
            $($event:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize)]
        #[serde(tag = "name")]
        $vis enum $set {
            $($event(::chainevents_core::Decoded<$event>),)+
        }

        impl $set {
            pub const CONTRACT: &'static str = $contract;

            pub fn events() -> Vec<$crate::common::EventInfo> {
                vec![$($crate::common::EventInfo::of::<$event>(Self::CONTRACT),)+]
            }

            pub fn signatures() -> Vec<::alloy_primitives::B256> {
                vec![$(<$event as ::chainevents_core::ContractEvent>::signature_hash(),)+]
            }

            /// Criteria matching every event of this contract.
            pub fn criteria() -> ::chainevents_core::FilterCriteria {
                ::chainevents_core::FilterCriteria::for_signatures(Self::CONTRACT, Self::signatures())
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$event(_) => <$event as ::chainevents_core::ContractEvent>::NAME,)+
                }
            }

            pub fn raw(&self) -> &::chainevents_core::RawLog {
                match self {
                    $(Self::$event(e) => &e.raw,)+
                }
            }
        }

        impl ::chainevents_core::DecodeLog for $set {
            fn decode_log(
                log: &::chainevents_core::RawLog,
            ) -> Result<Self, ::chainevents_core::DecodeError> {
                let signature = log.signature().ok_or_else(|| {
                    ::chainevents_core::DecodeError::MissingSignature {
                        event: Self::CONTRACT.to_string(),
                    }
                })?;
                $(
                    if signature == <$event as ::chainevents_core::ContractEvent>::signature_hash() {
                        return <::chainevents_core::Decoded<$event> as ::chainevents_core::DecodeLog>::decode_log(log)
                            .map(Self::$event);
                    }
                )+
                Err(::chainevents_core::DecodeError::UnknownEvent { signature })
            }
        }
    };
}

pub mod classify;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod four_momentum;
pub mod ghep;
pub mod logging;
pub mod parameter;
pub mod response;
pub mod run;
pub mod tables;
pub mod prelude {
    pub use crate::classify::{classify, Regime, Regimes};
    pub use crate::config::{
        BinnedResponse, ConfigError, KinematicVariable, ParameterConfig, RunConfig,
        UniverseResponse,
    };
    pub use crate::dispatch::{DispatchError, DispatchSummary, Validator};
    pub use crate::event::{EventRecord, ProcessInfo, QeLikeTarget};
    pub use crate::four_momentum::FourMomentum;
    pub use crate::ghep::{GHepFile, InputError};
    pub use crate::parameter::{
        ParamId, ParameterRegistry, SystParamHeader, SystRegistry, ValidationParameters,
    };
    pub use crate::response::{EventResponse, ResponseEngine, ResponseError, TabulatedEngine};
    pub use crate::run::{run, validate_events, RunError, RunSummary};
    pub use crate::tables::{
        OutputTables, QeMecRow, QeMecTable, ResonantRow, ResonantTable, OUTPUT_FILE,
    };
}

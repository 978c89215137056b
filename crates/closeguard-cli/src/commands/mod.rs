pub mod completion;
pub mod explain;
pub mod run;

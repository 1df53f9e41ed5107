/// Unique paper identifier (stable across runs).
/// Example: `77499681`
pub type PaperId = String;
/// Name of a subject field used to group papers.
/// Examples: `art`, `econ`, `phil`
pub type FieldName = String;
/// Abstract text of a paper.
/// Example: `We study the reception of Dutch genre painting ...`
pub type AbstractText = String;
/// Body text of a paper.
/// Example: `Introduction. The seventeenth century saw ...`
pub type BodyText = String;
/// Pipeline stage name used in error and log context.
/// Examples: `label`, `mix`, `split`
pub type StageName = &'static str;

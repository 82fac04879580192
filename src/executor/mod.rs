/// Executor module - handles SQL statement execution
///
/// Structure:
/// - dispatcher: `Database::execute` and routing by statement kind
/// - conditions: WHERE / HAVING evaluation
/// - subquery: outer-row binding and nested execution
/// - join: two-way joins
/// - aggregate: GROUP BY and aggregate functions
/// - functions: scalar functions used in projections
/// - queries: the SELECT pipeline and UNION chains
/// - dml: INSERT/UPDATE/DELETE operations
/// - ddl: CREATE TABLE

pub mod dispatcher;
pub mod conditions;
pub mod subquery;
pub mod join;
pub mod aggregate;
pub mod functions;
pub mod queries;
pub mod dml;
pub mod ddl;

pub use dispatcher::QueryResult;
pub use conditions::ConditionEvaluator;
pub use subquery::{bind_outer, SubqueryExecutor};
pub use join::JoinExecutor;
pub use aggregate::AggregateExecutor;
pub use functions::ScalarFunctions;
pub use queries::QueryExecutor;
pub use dml::DmlExecutor;
pub use ddl::DdlExecutor;

mod composition;
mod conflict_policy;
mod context;
mod super_calls;

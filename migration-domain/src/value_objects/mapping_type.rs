//! The closed set of entity-mapping kinds (§3.2).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    FolderToModule,
    TestcaseToTestcase,
    CycleToCycle,
    ExecutionToRun,
}

impl MappingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingType::FolderToModule => "folder_to_module",
            MappingType::TestcaseToTestcase => "testcase_to_testcase",
            MappingType::CycleToCycle => "cycle_to_cycle",
            MappingType::ExecutionToRun => "execution_to_run",
        }
    }
}

impl std::fmt::Display for MappingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

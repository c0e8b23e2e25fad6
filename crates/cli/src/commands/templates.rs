// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded, documented starting pipelines for `pipeforge init <template>`.

pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    pub yaml: &'static str,
}

pub const TEMPLATES: &[Template] = &[
    Template {
        name: "innosetup",
        description: "Build and package a Windows installer with Inno Setup",
        yaml: INNOSETUP,
    },
    Template {
        name: "dotnet",
        description: "Restore, build and test a .NET solution",
        yaml: DOTNET,
    },
    Template {
        name: "security",
        description: "Run a dependency/secret scan as a gated, non-fatal stage",
        yaml: SECURITY,
    },
    Template {
        name: "twincat",
        description: "Build a TwinCAT PLC project and archive the boot project",
        yaml: TWINCAT,
    },
    Template {
        name: "custom",
        description: "Minimal two-stage skeleton to adapt for anything else",
        yaml: CUSTOM,
    },
];

pub fn find(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

const INNOSETUP: &str = r#"# Builds an Inno Setup installer.
#
# Assumes your .iss script is at "installer/setup.iss" and produces its
# output under "installer/Output/". Adjust paths to match your project.
version: 1
name: Installer Build
working_directory: .
variables:
  ISCC: "C:\\Program Files (x86)\\Inno Setup 6\\ISCC.exe"
stages:
  - name: compile
    steps:
      - name: Compile installer
        description: Invoke the Inno Setup compiler against the .iss script
        command: "${ISCC}"
        arguments: installer/setup.iss
        timeout_seconds: 600
        artifacts:
          - installer/Output/*.exe
  - name: verify
    condition:
      requires_files:
        - installer/Output
    steps:
      - name: List produced installer
        command: dir
        arguments: installer/Output
        breakpoint: on_failure
watch:
  - path: installer
    filter: "*.iss"
    debounce_ms: 500
"#;

const DOTNET: &str = r#"# Restores, builds and tests a .NET solution.
version: 1
name: .NET Build
variables:
  CONFIGURATION: Release
stages:
  - name: restore
    steps:
      - name: Restore packages
        command: dotnet
        arguments: restore
        timeout_seconds: 300
  - name: build
    steps:
      - name: Build solution
        command: dotnet
        arguments: "build --configuration ${CONFIGURATION} --no-restore"
        timeout_seconds: 600
        artifacts:
          - "**/bin/${CONFIGURATION}/**/*.dll"
  - name: test
    continue_on_error: true
    steps:
      - name: Run unit tests
        command: dotnet
        arguments: "test --configuration ${CONFIGURATION} --no-build --logger trx"
        timeout_seconds: 900
        allow_failure: true
        artifacts:
          - "**/TestResults/*.trx"
"#;

const SECURITY: &str = r#"# Runs a dependency/secret scan as a non-fatal, gated stage. Intended to
# run alongside (not instead of) your normal build pipeline.
version: 1
name: Security Scan
stages:
  - name: scan
    steps:
      - name: Audit dependencies
        description: Fails the step, not the run, on findings — triage manually
        command: cargo
        arguments: audit
        allow_failure: true
        timeout_seconds: 300
      - name: Scan for committed secrets
        command: gitleaks
        arguments: "detect --no-git --source ."
        allow_failure: true
        breakpoint: on_failure
        timeout_seconds: 300
"#;

const TWINCAT: &str = r#"# Builds a TwinCAT PLC project via its command-line build tool and
# archives the resulting boot project.
version: 1
name: TwinCAT Build
variables:
  PROJECT: MyProject.sln
stages:
  - name: build
    steps:
      - name: Build TwinCAT solution
        command: TcBuild.exe
        arguments: "/build ${PROJECT}"
        timeout_seconds: 1200
        artifacts:
          - "**/Boot/*.tpzip"
  - name: archive
    steps:
      - name: Copy boot project to release folder
        command: xcopy
        arguments: "/Y /I Boot Releases\\${PIPEFORGE_RUN_ID}"
        condition:
          requires_exit_code: 0
watch:
  - path: .
    filter: "*.TcPOU"
    include_subdirectories: true
    debounce_ms: 1000
"#;

const CUSTOM: &str = r#"# Minimal two-stage skeleton: replace the commands below with your own.
version: 1
name: Custom Pipeline
stages:
  - name: build
    steps:
      - name: Build
        command: echo
        arguments: "build step goes here"
  - name: test
    steps:
      - name: Test
        command: echo
        arguments: "test step goes here"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_parses_and_has_at_least_one_stage() {
        for template in TEMPLATES {
            let definition = pipeforge_yaml::parse(template.yaml)
                .unwrap_or_else(|e| panic!("{} failed to parse: {e}", template.name));
            assert!(
                !definition.stages.is_empty(),
                "{} has no stages",
                template.name
            );
        }
    }

    #[test]
    fn every_template_passes_validation_without_errors() {
        for template in TEMPLATES {
            let definition = pipeforge_yaml::parse(template.yaml).unwrap();
            let result = pipeforge_validate::validate(&definition);
            assert!(
                !result.has_errors(),
                "{} has validation errors: {:?}",
                template.name,
                result.messages
            );
        }
    }

    #[test]
    fn find_is_case_insensitive() {
        assert!(find("DotNet").is_some());
        assert!(find("nonexistent").is_none());
    }

    fn step_count(definition: &pipeforge_core::PipelineDefinition) -> usize {
        definition.total_steps()
    }

    #[yare::parameterized(
        innosetup = { INNOSETUP },
        dotnet = { DOTNET },
        security = { SECURITY },
        twincat = { TWINCAT },
        custom = { CUSTOM },
    )]
    fn template_survives_a_parse_serialize_parse_round_trip(yaml: &str) {
        let original = pipeforge_yaml::parse(yaml).unwrap();
        let text = pipeforge_yaml::serialize(&original).unwrap();
        let reparsed = pipeforge_yaml::parse(&text).unwrap();

        assert_eq!(reparsed.stages.len(), original.stages.len());
        assert_eq!(step_count(&reparsed), step_count(&original));
        assert_eq!(reparsed.variables.len(), original.variables.len());
    }
}

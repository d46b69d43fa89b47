//! # Engine Properties
//!
//! Idempotence, canonicalization and matcher behavior, end to end against
//! the in-memory chain.

#[cfg(test)]
mod tests {
    use crate::integration::harness::*;
    use ism_deployer::{
        DeployRequest, DeployedModule, IsmConfig, IsmError, IsmModuleApi, ModuleType,
    };
    use primitive_types::H256;
    use std::collections::BTreeMap;

    // =========================================================================
    // IDEMPOTENCE AND CANONICALIZATION
    // =========================================================================

    #[tokio::test]
    async fn test_unchanged_multisig_redeploy_is_a_no_op() {
        let h = harness();
        let config = multisig(&[1, 2, 3], 2);

        let first = h
            .service
            .deploy(DeployRequest::new(LOCAL, config.clone()))
            .await
            .unwrap();

        h.executor.clear_activity();
        let second = h
            .service
            .deploy(DeployRequest::new(LOCAL, config))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert!(
            h.executor.submitted().is_empty(),
            "second deploy must submit zero transactions"
        );
    }

    #[tokio::test]
    async fn test_validator_order_is_irrelevant_to_identity() {
        let h = harness();
        let forward = h
            .service
            .deploy(DeployRequest::new(LOCAL, multisig(&[1, 2, 3], 2)))
            .await
            .unwrap();
        let reversed = h
            .service
            .deploy(DeployRequest::new(LOCAL, multisig(&[3, 2, 1], 2)))
            .await
            .unwrap();
        assert_eq!(forward, reversed);
    }

    #[tokio::test]
    async fn test_distinct_multisigs_deploy_as_separate_submodules() {
        let h = harness();
        let config = IsmConfig::Aggregation {
            modules: vec![multisig(&[1, 2, 3], 2), multisig(&[4, 5], 1)],
            threshold: 2,
        };
        let deployed = h
            .service
            .deploy(DeployRequest::new(LOCAL, config))
            .await
            .unwrap();

        let live = h.executor.module(LOCAL_DOMAIN, deployed).unwrap();
        assert_eq!(
            live.values.len(),
            2,
            "each multisig must land as its own submodule"
        );
        assert_ne!(live.values[0], live.values[1]);
        assert_eq!(live.threshold, 2);
    }

    #[tokio::test]
    async fn test_same_kind_leaves_with_different_params_stay_distinct() {
        let h = harness();
        let config = IsmConfig::Aggregation {
            modules: vec![
                IsmConfig::Pausable {
                    owner: addr(0xaa),
                    paused: false,
                },
                IsmConfig::Pausable {
                    owner: addr(0xbb),
                    paused: false,
                },
            ],
            threshold: 2,
        };
        let deployed = h
            .service
            .deploy(DeployRequest::new(LOCAL, config))
            .await
            .unwrap();

        let live = h.executor.module(LOCAL_DOMAIN, deployed).unwrap();
        assert_eq!(live.values.len(), 2);
        let owners: Vec<_> = live
            .values
            .iter()
            .map(|m| h.executor.module(LOCAL_DOMAIN, *m).unwrap().owner)
            .collect();
        assert!(owners.contains(&Some(addr(0xaa))));
        assert!(owners.contains(&Some(addr(0xbb))));
    }

    #[tokio::test]
    async fn test_shared_leaf_deploys_once_per_call() {
        let h = harness();
        // The same test leaf appears under two aggregation positions.
        let config = IsmConfig::Aggregation {
            modules: vec![IsmConfig::Test, IsmConfig::Test],
            threshold: 1,
        };
        h.service
            .deploy(DeployRequest::new(LOCAL, config))
            .await
            .unwrap();

        let creations = h
            .executor
            .submitted()
            .iter()
            .filter(|(_, intent)| matches!(intent.action, ism_deployer::TxAction::Create(_)))
            .count();
        assert_eq!(creations, 1, "identical leaf must come from the call cache");
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    #[tokio::test]
    async fn test_threshold_bounds_fail_before_any_chain_call() {
        let h = harness();
        for bad in [multisig(&[1, 2, 3], 4), multisig(&[1, 2, 3], 0)] {
            let err = h
                .service
                .deploy(DeployRequest::new(LOCAL, bad))
                .await
                .unwrap_err();
            assert!(matches!(err, IsmError::InvalidThreshold { .. }));
        }
        assert!(h.executor.submitted().is_empty());
        assert_eq!(h.executor.read_count(), 0);
    }

    // =========================================================================
    // MATCHER TOTALITY
    // =========================================================================

    #[tokio::test]
    async fn test_zero_address_never_matches_and_never_reads() {
        let h = harness();
        let config = routing(addr(0xaa), &[(ALPHA, IsmConfig::Test)]);

        let matched = h
            .service
            .module_matches_config(LOCAL, H256::zero(), &config, None)
            .await;

        assert!(!matched);
        assert_eq!(h.executor.read_count(), 0, "zero address must short-circuit");
    }

    #[tokio::test]
    async fn test_matcher_is_total_against_garbage_addresses() {
        let h = harness();
        let garbage = addr(0xdd);

        let object_shaped = [
            multisig(&[1, 2], 1),
            routing(addr(0xaa), &[(ALPHA, IsmConfig::Test)]),
            IsmConfig::Aggregation {
                modules: vec![IsmConfig::Test],
                threshold: 1,
            },
            IsmConfig::OpStack {
                native_bridge: addr(0xbb),
            },
            IsmConfig::Pausable {
                owner: addr(0xaa),
                paused: true,
            },
        ];
        for config in &object_shaped {
            assert!(
                !h.service
                    .module_matches_config(LOCAL, garbage, config, None)
                    .await,
                "no-code address must not match {config:?}"
            );
        }

        // The always-verifying leaf matches anything with code-independent
        // semantics, including an address without code.
        assert!(
            h.service
                .module_matches_config(LOCAL, garbage, &IsmConfig::Test, None)
                .await
        );
    }

    #[tokio::test]
    async fn test_wrong_module_type_does_not_match_routing() {
        let h = harness();
        let deployed = h
            .service
            .deploy(DeployRequest::new(LOCAL, IsmConfig::Test))
            .await
            .unwrap();

        let config = routing(addr(0xaa), &[(ALPHA, IsmConfig::Test)]);
        assert!(
            !h.service
                .module_matches_config(LOCAL, deployed, &config, None)
                .await
        );
    }

    #[tokio::test]
    async fn test_deployed_tree_matches_its_config() {
        let h = harness();
        let config = IsmConfig::Aggregation {
            modules: vec![multisig(&[1, 2, 3], 2), IsmConfig::Test],
            threshold: 2,
        };
        let deployed = h
            .service
            .deploy(DeployRequest::new(LOCAL, config.clone()))
            .await
            .unwrap();

        assert!(
            h.service
                .module_matches_config(LOCAL, deployed, &config, None)
                .await
        );
    }

    // =========================================================================
    // AGGREGATION BIJECTION
    // =========================================================================

    #[tokio::test]
    async fn test_aggregation_match_is_order_independent() {
        let h = harness();
        let first = multisig(&[1, 2, 3], 2);
        let second = multisig(&[4, 5], 1);

        let deployed = h
            .service
            .deploy(DeployRequest::new(
                LOCAL,
                IsmConfig::Aggregation {
                    modules: vec![first.clone(), second.clone()],
                    threshold: 2,
                },
            ))
            .await
            .unwrap();

        let reversed = IsmConfig::Aggregation {
            modules: vec![second, first],
            threshold: 2,
        };
        assert!(
            h.service
                .module_matches_config(LOCAL, deployed, &reversed, None)
                .await
        );
    }

    #[tokio::test]
    async fn test_aggregation_population_and_threshold_must_agree() {
        let h = harness();
        let inner = multisig(&[1, 2], 1);
        let deployed = h
            .service
            .deploy(DeployRequest::new(
                LOCAL,
                IsmConfig::Aggregation {
                    modules: vec![inner.clone(), IsmConfig::Test],
                    threshold: 1,
                },
            ))
            .await
            .unwrap();

        let wrong_threshold = IsmConfig::Aggregation {
            modules: vec![inner.clone(), IsmConfig::Test],
            threshold: 2,
        };
        assert!(
            !h.service
                .module_matches_config(LOCAL, deployed, &wrong_threshold, None)
                .await
        );

        let wrong_population = IsmConfig::Aggregation {
            modules: vec![inner],
            threshold: 1,
        };
        assert!(
            !h.service
                .module_matches_config(LOCAL, deployed, &wrong_population, None)
                .await
        );
    }

    #[tokio::test]
    async fn test_greedy_bijection_bias_on_overlapping_entries() {
        let h = harness();

        // Two live null modules X and Y under one aggregation.
        let x = addr(0x11);
        let y = addr(0x12);
        h.executor
            .seed_module(LOCAL_DOMAIN, x, DeployedModule::null_module());
        h.executor
            .seed_module(LOCAL_DOMAIN, y, DeployedModule::null_module());
        let aggregation = addr(0x13);
        h.executor.seed_module(
            LOCAL_DOMAIN,
            aggregation,
            DeployedModule::set_module(ModuleType::Aggregation, vec![x, y], 1),
        );

        // A valid bijection exists (X -> address entry, Y -> test entry),
        // but greedy matching consumes the test entry with X first and then
        // fails Y. The conservative answer is "no match".
        let greedy_trap = IsmConfig::Aggregation {
            modules: vec![IsmConfig::Test, IsmConfig::Address { address: x }],
            threshold: 1,
        };
        assert!(
            !h.service
                .module_matches_config(LOCAL, aggregation, &greedy_trap, None)
                .await
        );

        // With the entries the other way round the greedy pass succeeds.
        let reordered = IsmConfig::Aggregation {
            modules: vec![IsmConfig::Address { address: x }, IsmConfig::Test],
            threshold: 1,
        };
        assert!(
            h.service
                .module_matches_config(LOCAL, aggregation, &reordered, None)
                .await
        );
    }

    // =========================================================================
    // PAUSABLE ASYMMETRY
    // =========================================================================

    #[tokio::test]
    async fn test_pausable_paused_flag_is_asymmetric() {
        let h = harness();
        let owner = addr(0xaa);
        let live_paused = addr(0x21);
        let live_unpaused = addr(0x22);
        h.executor
            .seed_module(LOCAL_DOMAIN, live_paused, DeployedModule::pausable(owner, true));
        h.executor.seed_module(
            LOCAL_DOMAIN,
            live_unpaused,
            DeployedModule::pausable(owner, false),
        );

        let wants_paused = IsmConfig::Pausable { owner, paused: true };
        let wants_unpaused = IsmConfig::Pausable {
            owner,
            paused: false,
        };

        // Desired paused requires live paused.
        assert!(
            h.service
                .module_matches_config(LOCAL, live_paused, &wants_paused, None)
                .await
        );
        assert!(
            !h.service
                .module_matches_config(LOCAL, live_unpaused, &wants_paused, None)
                .await
        );
        // Desired unpaused accepts either live state. Faithful to the
        // deployed behavior; flagged upstream rather than corrected here.
        assert!(
            h.service
                .module_matches_config(LOCAL, live_unpaused, &wants_unpaused, None)
                .await
        );
        assert!(
            h.service
                .module_matches_config(LOCAL, live_paused, &wants_unpaused, None)
                .await
        );
    }

    #[tokio::test]
    async fn test_pausable_owner_must_match() {
        let h = harness();
        let live = addr(0x21);
        h.executor
            .seed_module(LOCAL_DOMAIN, live, DeployedModule::pausable(addr(0xaa), false));

        let config = IsmConfig::Pausable {
            owner: addr(0xbb),
            paused: false,
        };
        assert!(
            !h.service
                .module_matches_config(LOCAL, live, &config, None)
                .await
        );
    }

    // =========================================================================
    // CONFIG WIRE SHAPE
    // =========================================================================

    #[tokio::test]
    async fn test_json_config_deploys() {
        let h = harness();
        let json = r#"{
            "type": "routing",
            "kind": "domain",
            "owner": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "domains": {
                "alpha": { "type": "test" },
                "beta": {
                    "type": "multisig",
                    "kind": "messageId",
                    "validators": [
                        "0x0101010101010101010101010101010101010101010101010101010101010101",
                        "0x0202020202020202020202020202020202020202020202020202020202020202"
                    ],
                    "threshold": 1
                }
            }
        }"#;
        let config: IsmConfig = serde_json::from_str(json).unwrap();
        let deployed = h
            .service
            .deploy(DeployRequest::new(LOCAL, config.clone()))
            .await
            .unwrap();
        assert!(
            h.service
                .module_matches_config(LOCAL, deployed, &config, None)
                .await
        );
        let _: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
    }
}

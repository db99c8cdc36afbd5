//! Unit tests for ObjectManager against MockConnector

#[cfg(test)]
mod tests {
    use crate::mock::MockConnector;
    use crate::*;
    use serde_json::json;
    use std::sync::Arc;

    fn create_test_manager() -> (ObjectManager, MockConnector) {
        let mock = MockConnector::new();
        let manager = ObjectManager::new(Arc::new(mock.clone()), ObjectManagerConfig::new("tenant-1"));
        (manager, mock)
    }

    #[test]
    fn test_basic_attributes() {
        let (manager, _) = create_test_manager();

        let ea = manager.basic_attributes(true);
        assert_eq!(ea.len(), 3);
        assert_eq!(ea.get_bool(EA_CLOUD_API_OWNED), Some(true));
        assert_eq!(ea.get_str(EA_CMP_TYPE), Some("Docker"));
        assert_eq!(ea.get_str(EA_TENANT_ID), Some("tenant-1"));

        assert_eq!(manager.basic_attributes(false).get_bool(EA_CLOUD_API_OWNED), Some(false));
    }

    #[tokio::test]
    async fn test_create_network_view() {
        let (manager, mock) = create_test_manager();

        let view = manager.create_network_view("global_view").await.unwrap();

        assert_eq!(view.name, "global_view");
        assert_eq!(NetworkView::from_reference(&view.reference).unwrap().name, "global_view");
        assert_eq!(
            mock.last_create_body().unwrap(),
            json!({
                "name": "global_view",
                "extattrs": {
                    "Cloud API Owned": {"value": "False"},
                    "CMP Type": {"value": "Docker"},
                    "Tenant ID": {"value": "tenant-1"}
                }
            })
        );
    }

    #[tokio::test]
    async fn test_get_network_view_uses_sparse_template() {
        let (manager, mock) = create_test_manager();
        let reference = mock.seed("networkview", json!({"name": "default"}));

        let view = manager.get_network_view("default").await.unwrap().unwrap();
        assert_eq!(view.reference, reference);

        let calls = mock.calls();
        assert_eq!(calls.queries, vec![("networkview".to_string(), json!({"name": "default"}))]);
    }

    #[tokio::test]
    async fn test_get_network_view_not_found_is_none() {
        let (manager, _) = create_test_manager();
        assert!(manager.get_network_view("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_error_is_propagated() {
        let (manager, mock) = create_test_manager();
        mock.fail_next_call("connection reset");

        let result = manager.get_network_view("default").await;
        assert!(matches!(result, Err(InfobloxError::Api(msg)) if msg == "connection reset"));
    }

    #[tokio::test]
    async fn test_ensure_default_network_views_existing() {
        let (manager, mock) = create_test_manager();
        let global_ref = mock.seed("networkview", json!({"name": "default"}));
        let local_ref = mock.seed("networkview", json!({"name": "local"}));

        let (global, local) = manager.ensure_default_network_views("default", "local").await.unwrap();

        assert_eq!(global, global_ref);
        assert_eq!(local, local_ref);
        assert_eq!(mock.create_count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_default_network_views_creates_missing() {
        let (manager, mock) = create_test_manager();
        let global_ref = mock.seed("networkview", json!({"name": "default"}));

        let (global, local) = manager.ensure_default_network_views("default", "local").await.unwrap();

        assert_eq!(global, global_ref);
        assert_eq!(NetworkView::from_reference(&local).unwrap().name, "local");
        assert_eq!(mock.create_count(), 1);
        assert_eq!(mock.count("networkview"), 2);
    }

    #[tokio::test]
    async fn test_ensure_default_network_views_keeps_global_when_local_fails() {
        let (manager, mock) = create_test_manager();
        // Query global, create global, then the local query fails
        mock.fail_call(3, "appliance unavailable");

        let result = manager.ensure_default_network_views("default", "local").await;

        assert!(matches!(result, Err(InfobloxError::Api(msg)) if msg == "appliance unavailable"));
        assert_eq!(mock.count("networkview"), 1);
        assert!(manager.get_network_view("default").await.unwrap().is_some());
        assert_eq!(mock.delete_count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_configured_default_views() {
        let mock = MockConnector::new();
        let mut config = ObjectManagerConfig::new("tenant-1");
        config.global_network_view = "global_view".to_string();
        config.local_network_view = "local_view".to_string();
        let manager = ObjectManager::new(Arc::new(mock.clone()), config);

        let (global, local) = manager.ensure_configured_default_views().await.unwrap();

        assert_eq!(NetworkView::from_reference(&global).unwrap().name, "global_view");
        assert_eq!(NetworkView::from_reference(&local).unwrap().name, "local_view");
        assert_eq!(mock.create_count(), 2);
    }

    #[tokio::test]
    async fn test_create_and_get_network() {
        let (manager, mock) = create_test_manager();

        let network = manager.create_network("default", "10.1.0.0/24").await.unwrap();
        assert_eq!(network.cidr, "10.1.0.0/24");
        assert_eq!(network.ea.get_bool(EA_CLOUD_API_OWNED), Some(true));

        let found = manager.get_network("default", "10.1.0.0/24").await.unwrap().unwrap();
        assert_eq!(found.reference, network.reference);
        assert_eq!(found.network_view, "default");
        assert_eq!(found.ea.get_str(EA_TENANT_ID), Some("tenant-1"));

        assert!(manager.get_network("other", "10.1.0.0/24").await.unwrap().is_none());
        assert_eq!(mock.count("network"), 1);
    }

    #[tokio::test]
    async fn test_get_network_with_foreign_attribute_values() {
        let (manager, mock) = create_test_manager();
        mock.seed(
            "network",
            json!({
                "network": "10.3.0.0/24",
                "network_view": "default",
                "extattrs": {
                    "Site": {"value": ["a", "b"]},
                    "Ratio": {"value": 1.5},
                    "Tenant ID": {"value": "True"},
                    "Cloud API Owned": {"value": "True"}
                }
            }),
        );

        let network = manager.get_network("default", "10.3.0.0/24").await.unwrap().unwrap();

        assert_eq!(
            network.ea.get("Site"),
            Some(&EaValue::List(vec![EaValue::from("a"), EaValue::from("b")]))
        );
        assert_eq!(network.ea.get("Ratio"), Some(&EaValue::Other(json!(1.5))));
        assert_eq!(network.ea.get_str(EA_TENANT_ID), Some("True"));
        assert_eq!(network.ea.get_bool(EA_CLOUD_API_OWNED), Some(true));
    }

    #[tokio::test]
    async fn test_create_and_get_network_container() {
        let (manager, _) = create_test_manager();

        let container = manager.create_network_container("default", "10.0.0.0/8").await.unwrap();
        let parsed = NetworkContainer::from_reference(&container.reference).unwrap();
        assert_eq!(parsed.cidr, "10.0.0.0/8");

        let found = manager.get_network_container("default", "10.0.0.0/8").await.unwrap().unwrap();
        assert_eq!(found.reference, container.reference);
        assert!(manager.get_network("default", "10.0.0.0/8").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_allocate_network_derives_cidr_from_reference() {
        let (manager, mock) = create_test_manager();
        mock.seed("network", json!({"network": "10.0.0.0/24", "network_view": "local"}));

        let network = manager.allocate_network("local", "10.0.0.0/16", 24).await.unwrap();

        assert_eq!(network.cidr, "10.0.1.0/24");
        assert_eq!(network.network_view, "local");
        assert_eq!(
            mock.last_create_body().unwrap()["network"],
            json!("func:nextavailablenetwork:10.0.0.0/16,local,24")
        );
    }

    #[tokio::test]
    async fn test_allocate_network_undecodable_reference() {
        let (manager, mock) = create_test_manager();
        mock.respond_to_next_create_with("network/abc:garbage");

        let network = manager.allocate_network("local", "10.0.0.0/16", 24).await.unwrap();

        assert_eq!(network.reference, "network/abc:garbage");
        assert!(network.cidr.is_empty());
        assert!(network.network_view.is_empty());
    }

    #[tokio::test]
    async fn test_allocate_ip_defaults() {
        let (manager, mock) = create_test_manager();

        let address = manager.allocate_ip("default", "10.0.0.0/24", None, Some("")).await.unwrap();

        let body = mock.last_create_body().unwrap();
        assert_eq!(body["mac"], json!("00:00:00:00:00:00"));
        assert_eq!(body["extattrs"]["VM ID"], json!({"value": "N/A"}));
        assert_eq!(body["ipv4addr"], json!("func:nextavailableip:10.0.0.0/24,default"));
        assert_eq!(body["network"], json!("10.0.0.0/24"));
        assert_eq!(address.mac, ZERO_MAC);
        assert_eq!(address.ea.get_str(EA_VM_ID), Some(VM_ID_NOT_APPLICABLE));
    }

    #[tokio::test]
    async fn test_allocate_ip_extracts_address() {
        let (manager, _) = create_test_manager();

        let first = manager
            .allocate_ip("default", "10.0.0.0/24", Some("aa:bb:cc:dd:ee:ff"), Some("vm-1"))
            .await
            .unwrap();
        let second = manager.allocate_ip("default", "10.0.0.0/24", None, None).await.unwrap();

        assert_eq!(first.ipv4addr, "10.0.0.1");
        assert_eq!(first.mac, "aa:bb:cc:dd:ee:ff");
        assert_eq!(first.ea.get_str(EA_VM_ID), Some("vm-1"));
        assert_eq!(second.ipv4addr, "10.0.0.2");
    }

    #[tokio::test]
    async fn test_allocate_ip_server_chosen_reference() {
        let (manager, mock) = create_test_manager();
        mock.respond_to_next_create_with("fixedaddress/xyz:10.0.0.7/default");

        let address = manager.allocate_ip("default", "10.0.0.0/24", None, None).await.unwrap();

        assert_eq!(address.reference, "fixedaddress/xyz:10.0.0.7/default");
        assert_eq!(address.ipv4addr, "10.0.0.7");
    }

    #[tokio::test]
    async fn test_allocate_ip_undecodable_reference_leaves_address_empty() {
        let (manager, mock) = create_test_manager();
        mock.respond_to_next_create_with("record:host/xyz:host.example.com/default");

        let address = manager.allocate_ip("default", "10.0.0.0/24", None, None).await.unwrap();

        assert_eq!(address.reference, "record:host/xyz:host.example.com/default");
        assert!(address.ipv4addr.is_empty());
    }

    #[tokio::test]
    async fn test_allocate_ip_create_error() {
        let (manager, mock) = create_test_manager();
        mock.fail_next_call("no free addresses");

        let result = manager.allocate_ip("default", "10.0.0.0/24", None, None).await;
        assert!(matches!(result, Err(InfobloxError::Api(_))));
    }

    #[tokio::test]
    async fn test_release_ip() {
        let (manager, mock) = create_test_manager();
        let address = manager.allocate_ip("default", "10.0.0.0/24", None, None).await.unwrap();

        let deleted = manager.release_ip("default", &address.ipv4addr).await.unwrap();

        assert_eq!(deleted, address.reference);
        assert_eq!(mock.delete_count(), 1);
        assert_eq!(mock.count("fixedaddress"), 0);
    }

    #[tokio::test]
    async fn test_release_ip_not_found_issues_no_delete() {
        let (manager, mock) = create_test_manager();

        let result = manager.release_ip("default", "10.0.0.9").await;

        assert!(matches!(result, Err(InfobloxError::NotFound(_))));
        assert_eq!(mock.delete_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_local_network() {
        let (manager, mock) = create_test_manager();
        let network = manager.create_network("local", "10.2.0.0/24").await.unwrap();

        let deleted = manager.delete_local_network(&network.reference, "local").await.unwrap();

        assert_eq!(deleted, Some(network.reference));
        assert_eq!(mock.count("network"), 0);
    }

    #[tokio::test]
    async fn test_delete_local_network_foreign_view_is_noop() {
        let (manager, mock) = create_test_manager();
        let network = manager.create_network("default", "10.2.0.0/24").await.unwrap();

        let deleted = manager.delete_local_network(&network.reference, "local").await.unwrap();

        assert_eq!(deleted, None);
        assert_eq!(mock.delete_count(), 0);
        assert_eq!(mock.count("network"), 1);
    }

    #[tokio::test]
    async fn test_delete_local_network_undecodable_reference_is_noop() {
        let (manager, mock) = create_test_manager();

        let deleted = manager
            .delete_local_network("networkview/abc:local/false", "local")
            .await
            .unwrap();

        assert_eq!(deleted, None);
        assert_eq!(mock.delete_count(), 0);
    }

    #[tokio::test]
    async fn test_ea_definitions() {
        let (manager, mock) = create_test_manager();
        assert!(manager.get_ea_definition("Tenant ID").await.unwrap().is_none());

        let created = manager
            .create_ea_definition(EADefinition {
                name: "Tenant ID".to_string(),
                ea_type: "STRING".to_string(),
                comment: "Tenant owning the object".to_string(),
                allowed_object_types: vec!["Network".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!created.reference.is_empty());
        assert_eq!(mock.last_create_body().unwrap()["type"], json!("STRING"));

        let found = manager.get_ea_definition("Tenant ID").await.unwrap().unwrap();
        assert_eq!(found.reference, created.reference);
        assert_eq!(found.comment, "Tenant owning the object");
        assert_eq!(found.allowed_object_types, vec!["Network".to_string()]);
    }
}
